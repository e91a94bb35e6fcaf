//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the content root overrides them key by
//! key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Documentation"
//! description = ""
//! base_url = ""               # Absolute origin used for og:image and canonical URLs
//!
//! [locales]
//! supported = ["en", "fa"]    # The one canonical locale list
//! default = "en"              # Fallback locale (must be in `supported`)
//! rtl = ["fa", "ar"]          # Locales rendered right-to-left
//!
//! [content]
//! docs_dir = "docs"           # <content>/<docs_dir>/<locale>/...
//! extensions = ["mdx", "md"]
//! locales_dir = "locales"     # <content>/<locales_dir>/<locale>.json
//! assets_dir = "assets"       # copied to <output>/static/
//!
//! [search]
//! max_results = 20
//! index_file = "search-index.json"
//!
//! [og]
//! output_dir = "og-images"
//! logo = "assets/logo.png"
//! font_regular = "assets/fonts/Inter-Regular.ttf"
//! font_bold = "assets/fonts/Inter-Bold.ttf"
//! fallback_logo_text = "PG"
//! seed = 0
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

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
///
/// All fields have defaults. User config files need only specify the values
/// they want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in page titles and metadata.
    pub site: SiteInfo,
    /// Supported locales and the fallback locale.
    pub locales: LocalesConfig,
    /// Where content lives inside the content root.
    pub content: ContentConfig,
    /// Search index and result settings.
    pub search: SearchConfig,
    /// Open Graph card generation.
    pub og: OgConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locales.supported.is_empty() {
            return Err(ConfigError::Validation(
                "locales.supported must not be empty".into(),
            ));
        }
        if !self.locales.supported.contains(&self.locales.default) {
            return Err(ConfigError::Validation(format!(
                "locales.default '{}' is not in locales.supported",
                self.locales.default
            )));
        }
        if let Some(bad) = self
            .locales
            .supported
            .iter()
            .find(|code| code.is_empty() || code.contains(['/', '\\', '.']))
        {
            return Err(ConfigError::Validation(format!(
                "locales.supported contains an invalid code: '{bad}'"
            )));
        }
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::Validation(
                "search.max_results must be at least 1".into(),
            ));
        }
        if self.og.fallback_logo_text.chars().count() != 2 {
            return Err(ConfigError::Validation(
                "og.fallback_logo_text must be exactly two characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    /// Absolute origin (`https://docs.example.org`). Empty means relative URLs.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Documentation".to_string(),
            description: String::new(),
            base_url: String::new(),
        }
    }
}

/// Locale settings. `supported` is the single canonical list every
/// component reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalesConfig {
    pub supported: Vec<String>,
    pub default: String,
    pub rtl: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_string(), "fa".to_string()],
            default: "en".to_string(),
            rtl: vec!["fa".to_string(), "ar".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Directory holding one subdirectory per locale.
    pub docs_dir: String,
    /// File extensions treated as documents, in lookup priority order.
    pub extensions: Vec<String>,
    /// Directory holding `<locale>.json` UI string files.
    pub locales_dir: String,
    /// Static assets copied to `<output>/static/`.
    pub assets_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            docs_dir: "docs".to_string(),
            extensions: vec!["mdx".to_string(), "md".to_string()],
            locales_dir: "locales".to_string(),
            assets_dir: "assets".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Results kept after sorting, before the locale filter.
    pub max_results: usize,
    /// Index filename inside the output directory.
    pub index_file: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 20,
            index_file: "search-index.json".to_string(),
        }
    }
}

/// Open Graph card settings. Asset paths are relative to the content root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgConfig {
    pub output_dir: String,
    pub logo: String,
    pub font_regular: String,
    pub font_bold: String,
    /// Drawn in place of the logo when the logo image is missing.
    pub fallback_logo_text: String,
    /// Base seed for the speckle overlay.
    pub seed: u64,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self {
            output_dir: "og-images".to_string(),
            logo: "assets/logo.png".to_string(),
            font_regular: "assets/fonts/Inter-Regular.ttf".to_string(),
            font_bold: "assets/fonts/Inter-Bold.ttf".to_string(),
            fallback_logo_text: "PG".to_string(),
            seed: 0,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel OG rendering workers.
    /// When absent, defaults to the number of CPU cores.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never below one
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
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
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
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
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
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# polydoc configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Place this file at the root of the content directory.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
name = "Documentation"
description = ""
# Absolute origin used for og:image and canonical URLs, e.g.
# "https://docs.example.org". Leave empty for relative URLs.
base_url = ""

# ---------------------------------------------------------------------------
# Locales
# ---------------------------------------------------------------------------
[locales]
# Every locale the site is built for. Content lives in docs/<locale>/.
supported = ["en", "fa"]
# Pages missing in a locale fall back to this one.
default = "en"
# Locales rendered with dir="rtl".
rtl = ["fa", "ar"]

# ---------------------------------------------------------------------------
# Content layout
# ---------------------------------------------------------------------------
[content]
docs_dir = "docs"
# Document extensions, in lookup priority order.
extensions = ["mdx", "md"]
locales_dir = "locales"
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Search
# ---------------------------------------------------------------------------
[search]
max_results = 20
index_file = "search-index.json"

# ---------------------------------------------------------------------------
# Open Graph cards (paths are relative to the content directory)
# ---------------------------------------------------------------------------
[og]
output_dir = "og-images"
logo = "assets/logo.png"
font_regular = "assets/fonts/Inter-Regular.ttf"
font_bold = "assets/fonts/Inter-Bold.ttf"
# Two characters drawn when the logo image is missing.
fallback_logo_text = "PG"
# Speckle overlay seed. Same seed, same images.
seed = 0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel OG rendering workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_canonical_locales() {
        let config = SiteConfig::default();
        assert_eq!(config.locales.supported, vec!["en", "fa"]);
        assert_eq!(config.locales.default, "en");
    }

    #[test]
    fn default_config_has_search_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.search.index_file, "search-index.json");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[site]
name = "SudoBotz Documentation"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.name, "SudoBotz Documentation");
        // Defaults preserved
        assert_eq!(config.locales.default, "en");
        assert_eq!(config.content.docs_dir, "docs");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.locales.supported, vec!["en", "fa"]);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[locales]
supported = ["en", "fa", "ru"]

[search]
max_results = 5
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.locales.supported, vec!["en", "fa", "ru"]);
        assert_eq!(config.locales.default, "en");
        assert_eq!(config.search.max_results, 5);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[search]\nmax_result = 3\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[serach]\nmax_results = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn default_locale_must_be_supported() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[locales]\nsupported = [\"fa\"]\n",
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_locales() {
        let mut config = SiteConfig::default();
        config.locales.supported.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_path_like_locale() {
        let mut config = SiteConfig::default();
        config.locales.supported.push("../etc".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_results() {
        let mut config = SiteConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_long_logo_text() {
        let mut config = SiteConfig::default();
        config.og.fallback_logo_text = "ABC".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[og]
logo = "a.png"
seed = 1
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[og]\nseed = 7\n").unwrap();
        let merged = merge_toml(base, overlay);
        let og = merged.get("og").unwrap();
        assert_eq!(og.get("seed").unwrap().as_integer(), Some(7));
        assert_eq!(og.get("logo").unwrap().as_str(), Some("a.png"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("supported = [\"en\", \"fa\"]").unwrap();
        let overlay: toml::Value = toml::from_str("supported = [\"en\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("supported").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.locales.supported, vec!["en", "fa"]);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.og.fallback_logo_text, "PG");
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["site", "locales", "content", "search", "og", "processing"] {
            assert!(val.get(section).is_some(), "missing section {section}");
        }
    }
}
