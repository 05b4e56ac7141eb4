//! Compilation and resource processing for static site generation.
//!
//! This module hosts the build pipeline stages:
//!
//! - **partials**: Register reusable template fragments and localized texts
//! - **pages**: Compile `.hbs` page templates to HTML, once per language
//! - **sync**: Mirror the resources tree with delta transfer
//! - **styles**: Compile `.scss` stylesheets to CSS
//!
//! # Build Flow
//!
//! ```text
//! base partials ──► per-locale texts ──► compile pages
//!                                              │
//!                          sync resources ◄────┴────► compile styles
//! ```

pub mod pages;
pub mod partials;
pub mod styles;
pub mod sync;

use crate::error::BuildError;
use crate::log;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use pages::{CompileResult, compile_locale};
pub use partials::{PartialRegistry, discover_locales};
pub use styles::compile_styles;
pub use sync::sync_resources;

// ============================================================================
// Shared utilities
// ============================================================================

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all regular files from a directory recursively.
///
/// A missing root is an error so callers can tell "nothing found" from a
/// misconfigured path. An unreadable subtree is logged and skipped without
/// failing the rest of the walk.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(BuildError::DirectoryNotFound(dir.to_path_buf()).into());
    }

    let files = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log!("warn"; "skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    Ok(files)
}

/// Collect files restricted to the given extensions (without leading dot).
pub fn collect_files_with_ext(dir: &Path, exts: &[&str]) -> Result<Vec<PathBuf>> {
    let files = collect_files(dir)?
        .into_iter()
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| exts.contains(&e))
        })
        .collect();
    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_files_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.txt"), "x").unwrap();
        fs::write(dir.path().join("a/mid.txt"), "x").unwrap();
        fs::write(dir.path().join("a/b/deep.txt"), "x").unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_collect_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = collect_files(&missing).unwrap_err();
        assert!(
            err.downcast_ref::<BuildError>()
                .is_some_and(|e| matches!(e, BuildError::DirectoryNotFound(_)))
        );
    }

    #[test]
    fn test_collect_files_with_ext() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.hbs"), "x").unwrap();
        fs::write(dir.path().join("note.md"), "x").unwrap();
        fs::write(dir.path().join("raw.html"), "x").unwrap();

        let files = collect_files_with_ext(dir.path(), &["md", "html"]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| {
            let ext = p.extension().unwrap();
            ext == "md" || ext == "html"
        }));
    }

    #[test]
    fn test_ignored_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".DS_Store"), "x").unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }
}
