//! Lazily loaded, process-wide search index.
//!
//! [`IndexCache`] owns an [`IndexSource`] and loads it on the first
//! [`records`](IndexCache::records) call. Loading happens under the cache's
//! mutex, so concurrent first callers wait for one load instead of racing.
//! A successful load is kept for the life of the cache; a failed load is
//! logged, answered with an empty index, and retried on the next call.

use super::{SearchError, SearchRecord, SearchResponse, build, query};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Where an index comes from.
pub trait IndexSource: Send + Sync {
    fn load(&self) -> Result<Vec<SearchRecord>, SearchError>;
}

/// A `search-index.json` on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IndexSource for FileSource {
    fn load(&self) -> Result<Vec<SearchRecord>, SearchError> {
        build::read_index(&self.path)
    }
}

/// An index already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<SearchRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<SearchRecord>) -> Self {
        Self { records }
    }
}

impl IndexSource for MemorySource {
    fn load(&self) -> Result<Vec<SearchRecord>, SearchError> {
        Ok(self.records.clone())
    }
}

pub struct IndexCache<S: IndexSource> {
    source: S,
    loaded: Mutex<Option<Arc<[SearchRecord]>>>,
}

impl<S: IndexSource> IndexCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            loaded: Mutex::new(None),
        }
    }

    /// The cached index, loading it first if needed.
    pub fn records(&self) -> Arc<[SearchRecord]> {
        let mut slot = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(records) = slot.as_ref() {
            return Arc::clone(records);
        }
        match self.source.load() {
            Ok(records) => {
                let records: Arc<[SearchRecord]> = records.into();
                *slot = Some(Arc::clone(&records));
                records
            }
            Err(e) => {
                log::error!("Error loading search index: {e}");
                Arc::from(Vec::new())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Query the cached index. See [`query::search_records`].
    pub fn search(&self, query: &str, max_results: usize, locale: Option<&str>) -> SearchResponse {
        if query.trim().is_empty() {
            return SearchResponse::default();
        }
        let records = self.records();
        query::search_records(query, &records, max_results, locale)
    }
}
