//! Offline index builder.

use super::{SearchError, SearchRecord};
use crate::content::{self, ContentLoader};
use std::fs;
use std::path::Path;

/// Walk every supported locale and collect one record per document.
///
/// Locales are visited in configured order, files in path order. A missing
/// locale directory or an unparsable file is logged and skipped.
pub fn build_index(loader: &ContentLoader) -> Vec<SearchRecord> {
    let mut records = Vec::new();
    for locale in loader.locales().supported() {
        let entries = match loader.documents(locale) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping locale '{locale}': {e}");
                continue;
            }
        };
        for entry in entries {
            let parsed = match content::read_document(&entry.path) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::warn!("Skipping {}: {e}", entry.path.display());
                    continue;
                }
            };
            let fm = parsed.front_matter;
            records.push(SearchRecord {
                title: content::document_title(fm.title, &parsed.body),
                description: fm.description.unwrap_or_default(),
                content: parsed.body,
                url: entry.slug.url(locale),
                locale: locale.clone(),
                slug: entry.slug.to_string(),
            });
        }
    }
    records
}

/// Serialize records as pretty JSON, creating parent directories.
pub fn write_index(records: &[SearchRecord], path: &Path) -> Result<(), SearchError> {
    let io_err = |source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(records).map_err(|source| SearchError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}

pub fn read_index(path: &Path) -> Result<Vec<SearchRecord>, SearchError> {
    let json = fs::read_to_string(path).map_err(|source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| SearchError::Json {
        path: path.to_path_buf(),
        source,
    })
}
