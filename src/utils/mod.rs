//! Small shared utilities.

pub mod markup;
