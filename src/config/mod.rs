//! Site configuration management.
//!
//! Configuration is read from the project root, first match wins:
//! `config.json`, then `config.yaml`, then `config.yml`.
//!
//! | Field            | Purpose                                          |
//! |------------------|--------------------------------------------------|
//! | `i18n`           | enable per-language compilation (default true)   |
//! | `css`            | `bool` or `{ ignore: [dir] }` (default enabled)  |
//! | `extra_partials` | additional partial source trees, in order        |
//! | `validate_html`  | `false` or `{ preset: "standard" \| "strict" }`  |
//! | `abort_on_error` | stop the whole build on the first page failure   |
//!
//! # Example
//!
//! ```json
//! {
//!     "i18n": true,
//!     "css": { "ignore": ["vendor"] },
//!     "extra_partials": ["../shared/partials"],
//!     "validate_html": { "preset": "strict" }
//! }
//! ```

mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

/// Config file names probed under the project root, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["config.json", "config.yaml", "config.yml"];

// ============================================================================
// Field Variants
// ============================================================================

/// CSS pass configuration.
///
/// Accepts either a bare bool gate or an object carrying the ignore list;
/// both normalize to an explicit variant so the rest of the code never
/// branches on a raw shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "CssRaw")]
pub enum CssConfig {
    Disabled,
    Enabled { ignore: HashSet<String> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CssRaw {
    Toggle(bool),
    Options { ignore: Vec<String> },
}

impl From<CssRaw> for CssConfig {
    fn from(raw: CssRaw) -> Self {
        match raw {
            CssRaw::Toggle(false) => Self::Disabled,
            CssRaw::Toggle(true) => Self::Enabled {
                ignore: HashSet::new(),
            },
            CssRaw::Options { ignore } => Self::Enabled {
                ignore: ignore.into_iter().collect(),
            },
        }
    }
}

impl Default for CssConfig {
    fn default() -> Self {
        Self::Enabled {
            ignore: HashSet::new(),
        }
    }
}

/// HTML validation ruleset selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Standard,
    Strict,
}

/// HTML validation configuration: off, or on with a preset.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(from = "ValidateRaw")]
pub enum ValidateHtml {
    #[default]
    Off,
    Enabled {
        preset: Preset,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum ValidateRaw {
    Toggle(bool),
    Options {
        #[serde(default)]
        preset: Preset,
    },
}

impl From<ValidateRaw> for ValidateHtml {
    fn from(raw: ValidateRaw) -> Self {
        match raw {
            ValidateRaw::Toggle(false) => Self::Off,
            ValidateRaw::Toggle(true) => Self::Enabled {
                preset: Preset::Standard,
            },
            ValidateRaw::Options { preset } => Self::Enabled { preset },
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Project root (set after loading, not a config field)
    #[serde(skip)]
    root: PathBuf,

    /// Output directory; `None` means dry-run to stdout
    #[serde(skip)]
    pub output: Option<PathBuf>,

    /// Compile once per language directory under `texts/`
    #[serde(default = "default_true")]
    pub i18n: bool,

    /// Stylesheet compilation gate and ignore list
    #[serde(default)]
    pub css: CssConfig,

    /// Additional partial trees registered after the base partials
    #[serde(default)]
    pub extra_partials: Vec<PathBuf>,

    /// Post-render HTML validation
    #[serde(default)]
    pub validate_html: ValidateHtml,

    /// Abort the whole build on the first render/write failure
    #[serde(default)]
    pub abort_on_error: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./"),
            output: None,
            i18n: true,
            css: CssConfig::default(),
            extra_partials: Vec::new(),
            validate_html: ValidateHtml::Off,
            abort_on_error: false,
        }
    }
}

impl SiteConfig {
    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from the project root, first candidate wins.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_CANDIDATES {
            let path = root.join(name);
            if !path.exists() {
                continue;
            }
            let content =
                fs::read_to_string(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;
            let mut config = if name.ends_with(".json") {
                Self::from_json(&content)?
            } else {
                Self::from_yaml(&content)?
            };
            config.set_root(root);
            config.validate()?;
            return Ok(config);
        }
        Err(ConfigError::NotFound(root.to_path_buf()))
    }

    /// Apply the output directory and resolve relative paths against root.
    pub fn finalize(&mut self, output: Option<PathBuf>) {
        self.output = output;
        let root = self.root.clone();
        for path in &mut self.extra_partials {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }

    /// Validate field values beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let CssConfig::Enabled { ignore } = &self.css {
            for entry in ignore {
                if entry.is_empty() || entry.contains('/') || entry.contains('\\') {
                    return Err(ConfigError::Validation(format!(
                        "`css.ignore` entries must be plain directory names, got `{entry}`"
                    )));
                }
            }
        }
        for path in &self.extra_partials {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "`extra_partials` entries must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Path accessors
    // ------------------------------------------------------------------------

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    pub fn partials_dir(&self) -> PathBuf {
        self.root.join("partials")
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join("pages")
    }

    pub fn texts_dir(&self) -> PathBuf {
        self.root.join("texts")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("resources")
    }

    pub fn styles_dir(&self) -> PathBuf {
        self.root.join("styles")
    }
}

// ============================================================================
// Tests
// ============================================================================
