use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;

use super::loader::{load, LoadOptions};
use super::model::Table;
use crate::error::{Error, Result};

/// Caller-owned memoization of loads, keyed by (path, modification time).
///
/// Purely an optimization: [`load`] itself never caches, and a cache instance
/// belongs to one call-site configuration (the options are not part of the
/// key). A changed modification time supersedes the stale entry.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<(PathBuf, SystemTime), Arc<Table>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load through the cache. Hits are returned without touching the file
    /// contents; only the metadata is re-read.
    pub fn load(&mut self, path: &Path, options: &LoadOptions) -> Result<Arc<Table>> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let key = (path.to_path_buf(), modified);

        if let Some(hit) = self.entries.get(&key) {
            debug!("load cache hit for '{}'", path.display());
            return Ok(Arc::clone(hit));
        }

        let table = Arc::new(load(path, options)?);
        self.entries.retain(|(p, _), _| p.as_path() != path);
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
