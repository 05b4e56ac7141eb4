//! Build error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the build pipeline
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no such directory: `{0}`")]
    DirectoryNotFound(PathBuf),

    #[error("no languages detected under `{0}`")]
    NoLocalesFound(PathBuf),

    #[error("failed to render `{path}`: {message}")]
    TemplateRender { path: String, message: String },

    #[error("failed to compile stylesheet `{path}`: {message}")]
    StyleCompile { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::DirectoryNotFound(PathBuf::from("pages"));
        assert!(format!("{err}").contains("pages"));

        let err = BuildError::TemplateRender {
            path: "pages/index.hbs".into(),
            message: "partial not found".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("pages/index.hbs"));
        assert!(display.contains("partial not found"));
    }
}
