//! Stylesheet compilation.
//!
//! Compiles every standalone `.scss` file under the styles root to plain
//! CSS below `<output>/css/`, preserving the relative layout. Top-level
//! subdirectories named in the ignore set are skipped wholesale (vendored
//! sources, drafts). A compiler error aborts the pass: malformed CSS is a
//! source bug, not something to paper over.

use crate::compiler::collect_files_with_ext;
use crate::error::BuildError;
use crate::vlog;
use anyhow::{Context, Result};
use std::{
    collections::HashSet,
    fs,
    path::{Component, Path},
};

/// Preprocessor extension
const STYLE_EXT: &str = "scss";

/// Compile the styles tree. Returns the number of stylesheets written.
pub fn compile_styles(
    style_root: &Path,
    output_root: &Path,
    ignore: &HashSet<String>,
) -> Result<usize> {
    let options = grass::Options::default().load_path(style_root);
    let css_root = output_root.join("css");
    let mut compiled = 0;

    let mut files = collect_files_with_ext(style_root, &[STYLE_EXT])?;
    files.sort();

    for file in &files {
        let rel = file
            .strip_prefix(style_root)
            .with_context(|| format!("{} is outside the styles tree", file.display()))?;

        // Underscore-prefixed files are import-only fragments
        if rel
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'))
        {
            vlog!("css"; "skipping fragment {}", rel.display());
            continue;
        }

        if is_ignored(rel, ignore) {
            vlog!("css"; "skipping ignored {}", rel.display());
            continue;
        }

        let css = grass::from_path(file, &options).map_err(|err| BuildError::StyleCompile {
            path: rel.display().to_string(),
            message: err.to_string(),
        })?;

        let dest = css_root.join(rel.with_extension("css"));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&dest, css).with_context(|| format!("failed to write {}", dest.display()))?;
        compiled += 1;
    }

    Ok(compiled)
}

/// Whether the file's immediate top-level subdirectory is in the ignore set.
///
/// Files directly under the styles root have no such directory and are
/// never ignored.
fn is_ignored(rel: &Path, ignore: &HashSet<String>) -> bool {
    let mut components = rel.components();
    match (components.next(), components.next()) {
        // First component is a directory only if something follows it
        (Some(Component::Normal(first)), Some(_)) => first
            .to_str()
            .is_some_and(|name| ignore.contains(name)),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
