//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root and is optional; stock defaults are used for every key it
//! doesn't set.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! date_format = "%Y-%m-%d %H:%M"  # chrono format for `date:` metadata
//! sections = []                   # Folder names treated as sections
//! target_folder = "blog"          # Output prefix for everything (unset by default)
//!
//! [bundles]
//! extension = "textbundle"        # Folder extension that marks a bundle
//! main_file = "text.md"           # Main text file inside a bundle
//! assets_dir = "assets"           # Asset folder inside a bundle
//!
//! [markdown]
//! hard_breaks = true              # Single newlines become <br />
//!
//! [processing]
//! max_processes = 4               # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::ContentPath;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// chrono format string used to parse `date` metadata.
    pub date_format: String,
    /// Folder names (case-insensitive) that are sections rather than page containers.
    pub sections: Vec<String>,
    /// Prefix prepended to every asset output path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_folder: Option<String>,
    /// Bundle recognition settings.
    pub bundles: BundleConfig,
    /// Markdown rendering settings.
    pub markdown: MarkdownConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M".to_string(),
            sections: Vec::new(),
            target_folder: None,
            bundles: BundleConfig::default(),
            markdown: MarkdownConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.date_format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "date_format must not be empty".into(),
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "date_format `{}` is not a valid chrono format",
                self.date_format
            )));
        }
        if let Some(bad) = self
            .sections
            .iter()
            .find(|s| s.trim().is_empty() || s.contains('/'))
        {
            return Err(ConfigError::Validation(format!(
                "section id `{bad}` must be a non-empty folder name"
            )));
        }
        if let Some(target) = &self.target_folder {
            if !ContentPath::new(target).is_contained() {
                return Err(ConfigError::Validation(format!(
                    "target_folder `{target}` must not contain `.` or `..` segments"
                )));
            }
        }
        self.bundles.validate()
    }
}

/// How bundles are recognized and laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Folder extension (without the dot) that marks a bundle.
    pub extension: String,
    /// Name of the main text file inside a bundle.
    pub main_file: String,
    /// Name of the optional asset folder inside a bundle.
    pub assets_dir: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            extension: "textbundle".to_string(),
            main_file: "text.md".to_string(),
            assets_dir: "assets".to_string(),
        }
    }
}

impl BundleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "bundles.extension must be non-empty and given without a leading dot".into(),
            ));
        }
        for (key, value) in [("main_file", &self.main_file), ("assets_dir", &self.assets_dir)] {
            if value.is_empty() || value.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "bundles.{key} must be a plain file name"
                )));
            }
        }
        Ok(())
    }
}

/// Markdown rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Render single newlines inside paragraphs as line breaks.
    pub hard_breaks: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { hard_breaks: true }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bundle-site configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# chrono format used to parse the `date:` front-matter field.
# A value holding only the date part (e.g. 2024-03-01) is read as midnight UTC.
date_format = "%Y-%m-%d %H:%M"

# Top-level folders with these names (case-insensitive) are sections:
# every bundle inside becomes an item of that section. Any other folder is a
# page container.
sections = []

# Prefix for every asset output path, e.g. to publish content under /blog.
# target_folder = "blog"

# ---------------------------------------------------------------------------
# Bundles
# ---------------------------------------------------------------------------
[bundles]
# Folder extension that marks a bundle (no leading dot).
extension = "textbundle"

# Main text file inside each bundle.
main_file = "text.md"

# Optional asset folder inside each bundle, copied to the output.
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Markdown
# ---------------------------------------------------------------------------
[markdown]
# Render single newlines inside paragraphs as line breaks.
hard_breaks = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
