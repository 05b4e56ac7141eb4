//! Site building orchestration.
//!
//! # Pipeline
//!
//! ```text
//! build_site()
//!     │
//!     ├── base partials (partials/ + extra_partials, in order)
//!     │
//!     ├── discover locales ──► for each locale:
//!     │       clone base ──► layer texts ──► compile pages
//!     │
//!     └── sync_and_styles() ──► mirror resources, compile stylesheets
//! ```
//!
//! Base partials register before any extra source, and extras in config
//! order, so override precedence is: later extras > earlier extras > base.
//! Each locale pass works on a clone of the base registry; text partials
//! from one language are never visible to another.

use crate::{
    compiler::{compile_locale, compile_styles, discover_locales, sync_resources, PartialRegistry},
    config::{CssConfig, SiteConfig},
    log, vlog,
};
use anyhow::{Result, bail};
use std::{fs, path::Path};

/// Build the entire site: pages per locale, then resources and styles.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    init_scratch(config.root());

    let mut base = PartialRegistry::new();
    base.register_templates(&config.partials_dir())?;
    for extra in &config.extra_partials {
        base.register_templates(extra)?;
    }

    if config.i18n {
        let locales = discover_locales(&config.texts_dir())?;
        log!("i18n"; "detected languages: {}", locales.join(", "));

        for locale in &locales {
            let mut registry = base.clone();
            let count = registry.register_texts(&config.texts_dir().join(locale))?;
            vlog!("texts"; "[{locale}] {count} fragments registered");
            compile_locale(&registry, Some(locale), config)?;
        }
    } else {
        compile_locale(&base, None, config)?;
    }

    sync_and_styles(config)?;
    log!("build"; "done");
    Ok(())
}

/// Run the language-independent passes: resource sync, then CSS.
///
/// Also the re-run unit for watch mode. Both passes need a destination
/// tree, so they are skipped in stdout dry-run mode.
pub fn sync_and_styles(config: &SiteConfig) -> Result<()> {
    let Some(output) = &config.output else {
        vlog!("build"; "no output directory, skipping resource sync and styles");
        return Ok(());
    };

    let resources = config.resources_dir();
    if resources.is_dir() {
        let synced = sync_resources(&resources, output)?;
        log!("sync"; "{synced} resources synced");
    } else {
        vlog!("sync"; "no resources directory, skipping");
    }

    if let CssConfig::Enabled { ignore } = &config.css {
        let styles = config.styles_dir();
        if styles.is_dir() {
            let compiled = compile_styles(&styles, output, ignore)?;
            log!("css"; "{compiled} stylesheets compiled");
        } else {
            vlog!("css"; "no styles directory, skipping");
        }
    }

    Ok(())
}

/// Resource sync only (`--sync`), skipping compilation and styles.
pub fn sync_only(config: &SiteConfig) -> Result<()> {
    let Some(output) = &config.output else {
        bail!("resource sync requires an output directory (--output or COMPILE_OUTPUT)");
    };
    let synced = sync_resources(&config.resources_dir(), output)?;
    log!("sync"; "{synced} resources synced");
    Ok(())
}

/// Scratch space reserved for incremental builds; already-exists is fine.
fn init_scratch(root: &Path) {
    let _ = fs::create_dir_all(root.join(".tmp").join("texts"));
}

// ============================================================================
// Tests
// ============================================================================
