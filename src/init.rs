//! Site initialization module.
//!
//! Scaffolds the expected source layout with a minimal working sample:
//! one page, one partial, one localized text and one stylesheet.

use crate::log;
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Default config filename
const CONFIG_FILE: &str = "config.json";

/// Default site directory structure
const SITE_DIRS: &[&str] = &["partials", "pages", "texts/en", "resources", "styles"];

const DEFAULT_CONFIG: &str = r#"{
    "i18n": true,
    "css": true,
    "extra_partials": [],
    "validate_html": false,
    "abort_on_error": false
}
"#;

const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}">
<head>
<meta charset="utf-8">
<link rel="stylesheet" href="/css/main.css">
</head>
<body>
{{> header}}
{{> texts.hello}}
</body>
</html>
"#;

const SAMPLE_PARTIAL: &str = "<header>\n<p>{{lang}}</p>\n</header>\n";

const SAMPLE_TEXT: &str = "# Hello\n\nEdit `texts/en/hello.md` to change this text.\n";

const SAMPLE_STYLE: &str = "$accent: #2a7ae2;\n\nbody {\n  font-family: sans-serif;\n\n  a {\n    color: $accent;\n  }\n}\n";

/// Sample files written into the scaffolded layout
const SITE_FILES: &[(&str, &str)] = &[
    ("pages/index.hbs", SAMPLE_PAGE),
    ("partials/header.hbs", SAMPLE_PARTIAL),
    ("texts/en/hello.md", SAMPLE_TEXT),
    ("styles/main.scss", SAMPLE_STYLE),
    (CONFIG_FILE, DEFAULT_CONFIG),
];

/// Create a new site with the default structure and sample content.
pub fn new_site(root: &Path) -> Result<()> {
    if root.exists() && !is_dir_empty(root)? {
        bail!(
            "Path `{}` already exists and is not empty.",
            root.display()
        );
    }

    for dir in SITE_DIRS {
        let path = root.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    for (rel, content) in SITE_FILES {
        let path = root.join(rel);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    log!("init"; "site scaffolded at {}", root.display());
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_new_site_scaffolds_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("my-site");

        new_site(&root).unwrap();

        for sub in SITE_DIRS {
            assert!(root.join(sub).is_dir(), "missing {sub}");
        }
        for (rel, _) in SITE_FILES {
            assert!(root.join(rel).is_file(), "missing {rel}");
        }
    }

    #[test]
    fn test_scaffolded_config_loads() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("site");
        new_site(&root).unwrap();

        let config = SiteConfig::load(&root).unwrap();
        assert!(config.i18n);
        assert!(!config.abort_on_error);
    }

    #[test]
    fn test_new_site_refuses_non_empty_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("occupied.txt"), "x").unwrap();

        assert!(new_site(dir.path()).is_err());
    }
}
