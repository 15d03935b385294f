use async_trait::async_trait;

use crate::{
    errors::StoreError,
    models::{PaginationRequest, PaginationResult, UrlEntry},
};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key-value capability the id assigner and handlers run against.
///
/// Implementations must keep entries in insertion order for `find_all` and
/// must not overwrite an existing id or URL on `save`.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Ordered scan with an optional exclusive cursor.
    async fn find_all(&self, pagination: &PaginationRequest) -> Result<PaginationResult, StoreError>;

    async fn find_one(&self, id: &str) -> Result<Option<UrlEntry>, StoreError>;

    async fn find_one_by_url(&self, url: &str) -> Result<Option<UrlEntry>, StoreError>;

    /// Persist a new entry. Returns `false` if the id or URL is already taken.
    async fn save(&self, entry: &UrlEntry) -> Result<bool, StoreError>;

    /// Number of stored entries whose id starts with `root_key`.
    async fn count_all_by_root(&self, root_key: &str) -> Result<u64, StoreError>;
}
