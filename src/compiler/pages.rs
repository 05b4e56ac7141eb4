//! Per-language page compilation.
//!
//! Each locale gets one pass over the pages tree. Rendering happens on the
//! calling thread so the per-locale counters are exact the moment a page
//! succeeds or fails; the slower tidy/validate/write tail runs as spawned
//! tasks inside a rayon scope that the pass joins before reporting its
//! summary, so no write is dropped on exit.
//!
//! Per page: `Pending -> Rendered -> {OutputEmitted | Written} | Failed`,
//! no retries within a run.

use crate::compiler::collect_files_with_ext;
use crate::compiler::partials::{PartialRegistry, TEMPLATE_EXT};
use crate::config::{SiteConfig, ValidateHtml};
use crate::error::BuildError;
use crate::log;
use crate::utils::markup;
use anyhow::{Result, anyhow};
use serde_json::json;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Per-locale compilation tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompileResult {
    pub pages: usize,
    pub errors: usize,
}

/// Compile every page template for one locale (or the single implicit pass
/// when i18n is off).
///
/// The registry must already carry the locale's text partials. With no
/// output directory configured, rendered pages stream to stdout instead of
/// being post-processed and written.
pub fn compile_locale(
    registry: &PartialRegistry,
    locale: Option<&str>,
    config: &SiteConfig,
) -> Result<CompileResult> {
    let pages_dir = config.pages_dir();
    let mut files = collect_files_with_ext(&pages_dir, &[TEMPLATE_EXT])?;
    // A partials subtree nested under pages/ holds fragments, not pages
    let partials_segment = std::ffi::OsStr::new("partials");
    files.retain(|p| {
        p.strip_prefix(&pages_dir)
            .map_or(true, |rel| rel.components().all(|c| c.as_os_str() != partials_segment))
    });
    files.sort();

    let context = match locale {
        Some(lang) => json!({ "lang": lang }),
        None => json!({}),
    };

    let mut result = CompileResult::default();
    let deferred_errors = AtomicUsize::new(0);
    let fatal: Mutex<Option<anyhow::Error>> = Mutex::new(None);

    let rendered = rayon::scope(|scope| -> Result<()> {
        for file in &files {
            let rel = file.strip_prefix(&pages_dir).unwrap_or(file).to_path_buf();

            match render_page(registry, file, &context) {
                Ok(html) => {
                    result.pages += 1;
                    match &config.output {
                        None => println!("{html}"),
                        Some(out) => {
                            let job = PostProcess {
                                html,
                                dest: dest_path(out, locale, &rel),
                                rel: rel.display().to_string(),
                                validate: config.validate_html,
                                abort_on_error: config.abort_on_error,
                            };
                            let deferred = &deferred_errors;
                            let fatal = &fatal;
                            scope.spawn(move |_| job.run(deferred, fatal));
                        }
                    }
                }
                Err(err) => {
                    let err = BuildError::TemplateRender {
                        path: rel.display().to_string(),
                        message: format!("{err:#}"),
                    };
                    if config.abort_on_error {
                        return Err(err.into());
                    }
                    log!("error"; "{err}");
                    result.errors += 1;
                }
            }
        }
        Ok(())
    });
    rendered?;

    if let Ok(Some(err)) = fatal.into_inner() {
        return Err(err);
    }
    result.errors += deferred_errors.load(Ordering::Relaxed);

    match locale {
        Some(lang) => log!("compile"; "[{lang}] {} pages, {} errors", result.pages, result.errors),
        None => log!("compile"; "{} pages, {} errors", result.pages, result.errors),
    }

    Ok(result)
}

fn render_page(
    registry: &PartialRegistry,
    file: &Path,
    context: &serde_json::Value,
) -> Result<String> {
    let source = fs::read_to_string(file)?;
    registry.render(&source, context)
}

/// Destination for a page: output root, locale prefix when present,
/// relative page path with the template extension swapped for `.html`.
fn dest_path(out: &Path, locale: Option<&str>, rel: &Path) -> PathBuf {
    let rel = rel.with_extension("html");
    match locale {
        Some(lang) => out.join(lang).join(rel),
        None => out.join(rel),
    }
}

// ============================================================================
// Post-processing
// ============================================================================

/// Tidy/validate/write unit of work for one rendered page.
struct PostProcess {
    html: String,
    dest: PathBuf,
    rel: String,
    validate: ValidateHtml,
    abort_on_error: bool,
}

impl PostProcess {
    fn run(self, deferred_errors: &AtomicUsize, fatal: &Mutex<Option<anyhow::Error>>) {
        let Self {
            html,
            dest,
            rel,
            validate,
            abort_on_error,
        } = self;

        // Tidy failures keep the raw render
        let markup = match markup::pretty_print(&html) {
            Ok(tidied) => tidied,
            Err(err) => {
                log!("tidy"; "{rel}: {err}");
                html
            }
        };

        if let ValidateHtml::Enabled { preset } = validate {
            for violation in markup::validate(&markup, preset) {
                log!("lint"; "{rel}:{}: {}", violation.line, violation.message);
            }
        }

        let written = dest
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&dest, markup.as_bytes()));

        if let Err(err) = written {
            if abort_on_error {
                let mut slot = fatal.lock().unwrap_or_else(|e| e.into_inner());
                if slot.is_none() {
                    *slot = Some(anyhow!("failed to write {}: {err}", dest.display()));
                }
            } else {
                log!("error"; "failed to write {}: {err}", dest.display());
                deferred_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
