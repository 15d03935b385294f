use dashmap::DashMap;
use std::sync::Arc;

use crate::models::UrlEntry;

/// Thread-safe in-memory cache mapping id -> entry.
///
/// Entries are immutable once stored, so the cache is only ever filled:
/// on a resolve miss that hits the store, and right after a create.
#[derive(Clone, Debug)]
pub struct EntryCache {
    inner: Arc<DashMap<String, UrlEntry>>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    pub fn set(&self, entry: &UrlEntry) {
        self.inner.insert(entry.id.clone(), entry.clone());
    }

    /// Look up an id. Returns a clone of the entry if present.
    pub fn get(&self, id: &str) -> Option<UrlEntry> {
        self.inner.get(id).map(|v| v.clone())
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Default for EntryCache {
    fn default() -> Self {
        Self::new()
    }
}
