//! Table cache - memoizes loaded phrase tables by source string
//!
//! The first request for a source loads it (with fallback); every later
//! request for the same source string returns the same shared table without
//! touching the file or network again. Entries are never modified once
//! inserted, only replaced through [`TableCache::invalidate`].
//!
//! # Example
//! ```
//! use classroom_phrases::source::{DataSource, TableCache};
//!
//! let cache = TableCache::new(DataSource::default());
//! let first = cache.get_or_load("does-not-exist.csv");
//! let second = cache.get_or_load("does-not-exist.csv");
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{DataSource, LoadedTable};

/// Thread-safe memo of loaded tables keyed by source string
pub struct TableCache {
    /// Loaded tables by source string
    entries: RwLock<HashMap<String, Arc<LoadedTable>>>,
    /// Loader used on a cache miss
    source: DataSource,
}

impl TableCache {
    /// Create an empty cache backed by `source`
    pub fn new(source: DataSource) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            source,
        }
    }

    /// Return the table for `key`, loading it on first use
    ///
    /// No lock is held while loading. Two callers missing the same key at
    /// once may both load it; the first insert wins and both get that table.
    pub fn get_or_load(&self, key: &str) -> Arc<LoadedTable> {
        if let Some(entry) = self.entries.read().get(key) {
            log::debug!("Phrase table cache hit for '{}'", key);
            return Arc::clone(entry);
        }

        let loaded = Arc::new(self.source.try_load_or_default(key));
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key.to_string()).or_insert(loaded))
    }

    /// Drop the cached table for `key` so the next request reloads it
    ///
    /// Returns `true` if an entry was removed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Number of cached sources
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if nothing has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
