//! UI string dictionaries.
//!
//! Each locale may ship `<content>/locales/<locale>.json`. Lookup for a
//! locale tries its own file, then the default locale's file, then the
//! English dictionary compiled into the binary. Keys missing from a file
//! take their English value.

use crate::locale::LocaleSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid translation file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Translations {
    pub app_name: String,
    pub app_description: String,
    pub version: String,
    pub documentation: String,
    pub github: String,
    pub on_this_page: String,
    pub not_found: String,
    pub search: SearchStrings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchStrings {
    pub placeholder: String,
    pub button: String,
    pub title: String,
    pub no_results: String,
    pub no_results_description: String,
    pub searching: String,
    pub instructions: String,
    pub shortcuts: Shortcuts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcuts {
    pub search: String,
    pub navigate: String,
    pub select: String,
}

impl Default for Translations {
    fn default() -> Self {
        Self {
            app_name: "SudoBotz".into(),
            app_description: "Censorship-resistant GUI integrated solution".into(),
            version: "V1 First Version".into(),
            documentation: "Documentation".into(),
            github: "GitHub".into(),
            on_this_page: "On this page".into(),
            not_found: "Page Not Found".into(),
            search: SearchStrings::default(),
        }
    }
}

impl Default for SearchStrings {
    fn default() -> Self {
        Self {
            placeholder: "Search documentation...".into(),
            button: "Search".into(),
            title: "Search Documentation".into(),
            no_results: "No results found".into(),
            no_results_description: "Try a different search term".into(),
            searching: "Searching...".into(),
            instructions: "Type to search across all pages".into(),
            shortcuts: Shortcuts::default(),
        }
    }
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            search: "to search".into(),
            navigate: "to navigate".into(),
            select: "to select".into(),
        }
    }
}

/// Read one translation file.
pub fn load_translations(path: &Path) -> Result<Translations, TranslationError> {
    let json = fs::read_to_string(path).map_err(|source| TranslationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| TranslationError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-locale dictionary cache.
///
/// Dictionaries are read on first use and kept; the fallback result is
/// cached under the requested locale too.
pub struct Translator {
    dir: PathBuf,
    locales: LocaleSet,
    cache: Mutex<HashMap<String, Arc<Translations>>>,
}

impl Translator {
    pub fn new(dir: impl Into<PathBuf>, locales: LocaleSet) -> Self {
        Self {
            dir: dir.into(),
            locales,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, locale: &str) -> Arc<Translations> {
        let locale = self.locales.or_default(locale).to_string();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(t) = cache.get(&locale) {
            return Arc::clone(t);
        }
        let t = Arc::new(self.resolve(&locale));
        cache.insert(locale, Arc::clone(&t));
        t
    }

    fn resolve(&self, locale: &str) -> Translations {
        let default = self.locales.default_locale();
        let mut attempts = vec![locale];
        if locale != default {
            attempts.push(default);
        }
        for code in attempts {
            match load_translations(&self.dir.join(format!("{code}.json"))) {
                Ok(t) => return t,
                Err(e) => log::warn!("Failed to load translations for locale '{locale}': {e}"),
            }
        }
        Translations::default()
    }
}
