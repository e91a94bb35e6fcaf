//! Static search: an offline index builder plus in-process querying.
//!
//! ```text
//! build     docs/<locale>/**  →  search-index.json   (flat JSON array)
//! query     index + "ticket setup"  →  SearchResponse
//! cache     IndexCache loads the array once per process
//! ```
//!
//! The index is rebuilt in full on every build; there is no incremental
//! update.

pub mod build;
pub mod cache;
pub mod query;

pub use build::{build_index, read_index, write_index};
pub use cache::{FileSource, IndexCache, IndexSource, MemorySource};
pub use query::{score, search_records};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid search index {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One indexed document. Field names are the on-disk JSON names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    pub locale: String,
    pub slug: String,
}

/// A record with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: SearchRecord,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub count: usize,
    #[serde(rename = "elapsed")]
    pub elapsed_ms: u64,
}
