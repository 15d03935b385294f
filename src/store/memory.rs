use async_trait::async_trait;
use tokio::sync::RwLock;

use super::EntryStore;
use crate::{
    errors::StoreError,
    models::{PaginationRequest, PaginationResult, UrlEntry},
    pagination,
};

/// Process-local store. Entries live in a vector in insertion order, which
/// doubles as the scan order for pagination.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<UrlEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing entries, kept in the given order.
    pub fn with_entries(entries: Vec<UrlEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn find_all(&self, request: &PaginationRequest) -> Result<PaginationResult, StoreError> {
        let entries = self.entries.read().await;
        Ok(pagination::paginate(&entries, request))
    }

    async fn find_one(&self, id: &str) -> Result<Option<UrlEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn find_one_by_url(&self, url: &str) -> Result<Option<UrlEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.url == url).cloned())
    }

    async fn save(&self, entry: &UrlEntry) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id == entry.id || e.url == entry.url) {
            return Ok(false);
        }
        entries.push(entry.clone());
        Ok(true)
    }

    async fn count_all_by_root(&self, root_key: &str) -> Result<u64, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| e.id.starts_with(root_key)).count() as u64)
    }
}
