//! Partial registration and language discovery.
//!
//! A [`PartialRegistry`] is an explicit mapping of partial names to template
//! fragments, wrapped around a handlebars registry. It is built once per run
//! from the base `partials/` tree plus any `extra_partials` sources, then
//! cloned per locale so locale-scoped text fragments never leak between
//! language passes.
//!
//! Registration is last-write-wins: base partials first, then extra sources
//! in config order, so extras override base and later extras override
//! earlier ones.

use crate::compiler::collect_files_with_ext;
use crate::error::BuildError;
use handlebars::Handlebars;
use pulldown_cmark::{Parser, html};
use std::{fs, path::Path};

use anyhow::{Context, Result};

/// Template-language extension for partials and pages
pub const TEMPLATE_EXT: &str = "hbs";

/// Extensions of localized text fragments
const TEXT_EXTS: &[&str] = &["md", "html"];

// ============================================================================
// Partial Registry
// ============================================================================

/// Named mapping of reusable template fragments.
#[derive(Clone)]
pub struct PartialRegistry {
    hbs: Handlebars<'static>,
}

impl PartialRegistry {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(false);
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Register every template-extension file under `root` as a partial
    /// named after its file stem. Later registrations silently override
    /// earlier ones.
    pub fn register_templates(&mut self, root: &Path) -> Result<()> {
        for file in collect_files_with_ext(root, &[TEMPLATE_EXT])? {
            let name = file
                .file_stem()
                .and_then(|s| s.to_str())
                .with_context(|| format!("invalid template name: {}", file.display()))?
                .to_owned();
            let content = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            self.hbs
                .register_partial(&name, content)
                .with_context(|| format!("failed to register partial `{name}`"))?;
        }
        Ok(())
    }

    /// Register every Markdown and HTML file under `root` as a text partial.
    ///
    /// Markdown is rendered to HTML; HTML passes through unchanged. The
    /// partial name is `texts.` followed by the relative path (extension
    /// dropped) with separators flattened to dots: `<root>/a/b.md` becomes
    /// `texts.a.b`.
    ///
    /// Returns the number of fragments registered, for diagnostics.
    pub fn register_texts(&mut self, root: &Path) -> Result<usize> {
        let mut count = 0;
        for file in collect_files_with_ext(root, TEXT_EXTS)? {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let content = if file.extension().is_some_and(|e| e == "md") {
                render_markdown(&raw)
            } else {
                raw
            };
            let name = text_partial_name(root, &file)?;
            self.hbs
                .register_partial(&name, content)
                .with_context(|| format!("failed to register text partial `{name}`"))?;
            count += 1;
        }
        Ok(count)
    }

    /// Expand a page template against the given context.
    pub fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        Ok(self.hbs.render_template(template, context)?)
    }

    /// Whether a partial with the given name is bound.
    #[cfg(test)]
    pub fn has_partial(&self, name: &str) -> bool {
        self.hbs.has_template(name)
    }
}

impl Default for PartialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the dotted partial name for a text fragment.
fn text_partial_name(root: &Path, file: &Path) -> Result<String> {
    let rel = file
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", file.display(), root.display()))?
        .with_extension("");

    let mut name = String::from("texts");
    for component in rel.components() {
        let part = component
            .as_os_str()
            .to_str()
            .with_context(|| format!("non-unicode path: {}", file.display()))?;
        name.push('.');
        name.push_str(part);
    }
    Ok(name)
}

/// Render Markdown source to an HTML fragment.
fn render_markdown(source: &str) -> String {
    let parser = Parser::new(source);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

// ============================================================================
// Language Discovery
// ============================================================================

/// Enumerate available locales as the sorted set of subdirectory names
/// under the texts root.
///
/// Plain files under the root are not locales. A missing root or an empty
/// set is fatal for the whole build; with i18n enabled that almost always
/// means a misconfigured source tree.
pub fn discover_locales(texts_root: &Path) -> Result<Vec<String>> {
    if !texts_root.is_dir() {
        return Err(BuildError::DirectoryNotFound(texts_root.to_path_buf()).into());
    }

    let mut locales: Vec<String> = fs::read_dir(texts_root)
        .with_context(|| format!("failed to read {}", texts_root.display()))?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .collect();

    if locales.is_empty() {
        return Err(BuildError::NoLocalesFound(texts_root.to_path_buf()).into());
    }

    locales.sort();
    Ok(locales)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_register_templates_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "header.hbs", "<header>{{lang}}</header>");
        write(dir.path(), "nav/footer.hbs", "<footer/>");
        write(dir.path(), "readme.txt", "not a template");

        let mut registry = PartialRegistry::new();
        registry.register_templates(dir.path()).unwrap();

        assert!(registry.has_partial("header"));
        assert!(registry.has_partial("footer"));
        assert!(!registry.has_partial("readme"));
    }

    #[test]
    fn test_extra_partials_override_base() {
        let base = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();
        write(base.path(), "x.hbs", "base");
        write(extra.path(), "x.hbs", "extra");

        let mut registry = PartialRegistry::new();
        registry.register_templates(base.path()).unwrap();
        registry.register_templates(extra.path()).unwrap();

        let out = registry.render("{{> x}}", &json!({})).unwrap();
        assert_eq!(out, "extra");
    }

    #[test]
    fn test_text_partial_naming_and_markdown() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/b.md", "# Title");
        write(dir.path(), "plain.html", "<p>as-is</p>");

        let mut registry = PartialRegistry::new();
        let count = registry.register_texts(dir.path()).unwrap();
        assert_eq!(count, 2);

        let out = registry.render("{{> texts.a.b}}", &json!({})).unwrap();
        assert!(out.contains("<h1>Title</h1>"));

        let out = registry.render("{{> texts.plain}}", &json!({})).unwrap();
        assert_eq!(out, "<p>as-is</p>");
    }

    #[test]
    fn test_text_partial_name_flattening() {
        let root = Path::new("/texts/en");
        let name = text_partial_name(root, Path::new("/texts/en/a/b.md")).unwrap();
        assert_eq!(name, "texts.a.b");

        let name = text_partial_name(root, Path::new("/texts/en/hello.html")).unwrap();
        assert_eq!(name, "texts.hello");
    }

    #[test]
    fn test_locale_isolation_via_clone() {
        let texts = tempfile::tempdir().unwrap();
        write(texts.path(), "en/hello.md", "english");
        write(texts.path(), "fr/hello.md", "french");

        let base = PartialRegistry::new();

        let mut en = base.clone();
        en.register_texts(&texts.path().join("en")).unwrap();
        let mut fr = base.clone();
        fr.register_texts(&texts.path().join("fr")).unwrap();

        let out = en.render("{{> texts.hello}}", &json!({})).unwrap();
        assert!(out.contains("english"));
        let out = fr.render("{{> texts.hello}}", &json!({})).unwrap();
        assert!(out.contains("french"));
        // base stays clean
        assert!(!base.has_partial("texts.hello"));
    }

    #[test]
    fn test_discover_locales() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fr")).unwrap();
        fs::create_dir(dir.path().join("en")).unwrap();
        fs::write(dir.path().join("readme.txt"), "not a locale").unwrap();

        let locales = discover_locales(dir.path()).unwrap();
        assert_eq!(locales, vec!["en".to_string(), "fr".to_string()]);
    }

    #[test]
    fn test_discover_locales_empty_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_locales(dir.path()).unwrap_err();
        assert!(
            err.downcast_ref::<BuildError>()
                .is_some_and(|e| matches!(e, BuildError::NoLocalesFound(_)))
        );
    }

    #[test]
    fn test_discover_locales_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_locales(&dir.path().join("texts")).unwrap_err();
        assert!(
            err.downcast_ref::<BuildError>()
                .is_some_and(|e| matches!(e, BuildError::DirectoryNotFound(_)))
        );
    }
}
