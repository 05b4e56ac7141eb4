//! Logging utilities with colored module prefixes.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `vlog!` macro for verbose-only diagnostics
//!
//! Error and warning modules are routed to stderr; everything else goes to
//! stdout and is suppressed by `--quiet`.
//!
//! # Example
//!
//! ```ignore
//! log!("compile"; "building {} pages", count);
//! log!("error"; "{err:#}");
//! vlog!("texts"; "en: {} fragments", count);
//! ```

use colored::{ColoredString, Colorize};
use std::{
    io::{Write, stderr, stdout},
    sync::atomic::{AtomicU8, Ordering},
};

// ============================================================================
// Verbosity Levels
// ============================================================================

pub const LEVEL_QUIET: u8 = 0;
pub const LEVEL_NORMAL: u8 = 1;
pub const LEVEL_VERBOSE: u8 = 2;

static LEVEL: AtomicU8 = AtomicU8::new(LEVEL_NORMAL);

/// Set the global log level from CLI flags.
///
/// `--quiet` wins over `--verbose` when both are given.
pub fn set_level(quiet: bool, verbose: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LEVEL_QUIET,
        (false, true) => LEVEL_VERBOSE,
        (false, false) => LEVEL_NORMAL,
    };
    LEVEL.store(level, Ordering::SeqCst);
}

fn level() -> u8 {
    LEVEL.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message only when `--verbose` is active.
#[macro_export]
macro_rules! vlog {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::vlog($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Whether a module name designates diagnostic output (stderr, never gated
/// below warnings by `--quiet` in the error case).
fn is_error_module(module: &str) -> bool {
    matches!(module, "error")
}

fn is_warn_module(module: &str) -> bool {
    matches!(module, "warn" | "lint" | "tidy")
}

/// Log a message with a colored module prefix.
///
/// Errors always print to stderr. Warnings print to stderr unless quiet.
/// Informational messages print to stdout unless quiet.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    if is_error_module(module) {
        let mut stderr = stderr().lock();
        writeln!(stderr, "{prefix} {message}").ok();
        return;
    }

    if level() == LEVEL_QUIET {
        return;
    }

    if is_warn_module(module) {
        let mut stderr = stderr().lock();
        writeln!(stderr, "{prefix} {message}").ok();
    } else {
        let mut stdout = stdout().lock();
        writeln!(stdout, "{prefix} {message}").ok();
        stdout.flush().ok();
    }
}

/// Log a message only at verbose level.
pub fn vlog(module: &str, message: &str) {
    if level() >= LEVEL_VERBOSE {
        log(module, message);
    }
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module {
        "watch" => prefix.bright_green().bold(),
        "sync" => prefix.bright_blue().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" | "lint" | "tidy" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

// ============================================================================
// Tests
// ============================================================================
