use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use super::EntryStore;
use crate::{
    errors::StoreError,
    models::{PaginationRequest, PaginationResult, UrlEntry},
    pagination,
};

/// SQLite-backed store. Insertion order is the `seq` rowid, which is what
/// cursors resume from.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating the file if needed) and migrate the database.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = database_url
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run embedded migrations (files in migrations/).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn find_all(&self, request: &PaginationRequest) -> Result<PaginationResult, StoreError> {
        // An unknown cursor resolves to seq 0, i.e. the start of the table.
        let start_seq = match request.cursor() {
            Some(key) => sqlx::query_scalar::<_, i64>("SELECT seq FROM entries WHERE id = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?
                .unwrap_or(0),
            None => 0,
        };

        let limit = i64::try_from(request.window_len()).unwrap_or(i64::MAX);
        let window: Vec<UrlEntry> = sqlx::query_as(
            "SELECT id, root_key, url FROM entries
             WHERE seq > ?1
             ORDER BY seq
             LIMIT ?2",
        )
        .bind(start_seq)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(pagination::page_from_window(
            window,
            request.effective_page_size(),
        ))
    }

    async fn find_one(&self, id: &str) -> Result<Option<UrlEntry>, StoreError> {
        let entry = sqlx::query_as("SELECT id, root_key, url FROM entries WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn find_one_by_url(&self, url: &str) -> Result<Option<UrlEntry>, StoreError> {
        let entry = sqlx::query_as("SELECT id, root_key, url FROM entries WHERE url = ?1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn save(&self, entry: &UrlEntry) -> Result<bool, StoreError> {
        let affected = sqlx::query(
            "INSERT OR IGNORE INTO entries (id, root_key, url) VALUES (?1, ?2, ?3)",
        )
        .bind(&entry.id)
        .bind(&entry.root_key)
        .bind(&entry.url)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn count_all_by_root(&self, root_key: &str) -> Result<u64, StoreError> {
        // substr rather than LIKE so '%' and '_' in a root are matched literally.
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM entries WHERE substr(id, 1, length(?1)) = ?1",
        )
        .bind(root_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;

    /// A migrated in-memory database. One connection that never recycles,
    /// since every new SQLite memory connection is a fresh database.
    pub(crate) async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteStore::from_pool(pool);
        store.migrate().await.unwrap();
        store
    }

    async fn seeded(n: usize) -> SqliteStore {
        let store = memory_store().await;
        for i in 1..=n {
            let entry = UrlEntry::new(format!("key{i}"), "key", format!("http://ex{i}.sample"));
            assert!(store.save(&entry).await.unwrap());
        }
        store
    }

    fn ids(page: &PaginationResult) -> Vec<&str> {
        page.items.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn save_and_lookup() {
        let store = memory_store().await;
        let entry = UrlEntry::new("abc0", "abc", "http://one.sample");
        assert!(store.save(&entry).await.unwrap());
        assert_eq!(store.find_one("abc0").await.unwrap(), Some(entry.clone()));
        assert_eq!(store.find_one_by_url("http://one.sample").await.unwrap(), Some(entry));
        assert_eq!(store.find_one("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_save_reports_false() {
        let store = memory_store().await;
        let entry = UrlEntry::new("abc0", "abc", "http://one.sample");
        assert!(store.save(&entry).await.unwrap());
        assert!(!store.save(&UrlEntry::new("abc0", "abc", "http://two.sample")).await.unwrap());
        assert!(!store.save(&UrlEntry::new("def0", "def", "http://one.sample")).await.unwrap());
    }

    #[tokio::test]
    async fn prefix_count_is_literal() {
        let store = memory_store().await;
        store.save(&UrlEntry::new("a_b0", "a_b", "http://one.sample")).await.unwrap();
        store.save(&UrlEntry::new("axb0", "axb", "http://two.sample")).await.unwrap();
        store.save(&UrlEntry::new("a_b1", "a_b", "http://three.sample")).await.unwrap();
        assert_eq!(store.count_all_by_root("a_b").await.unwrap(), 2);
        assert_eq!(store.count_all_by_root("a%").await.unwrap(), 0);
        assert_eq!(store.count_all_by_root("a").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn first_page_with_default_size() {
        let store = seeded(11).await;
        let page = store.find_all(&PaginationRequest::default()).await.unwrap();
        assert_eq!(page.num_items, 10);
        assert_eq!(page.last_key.as_deref(), Some("key10"));
    }

    #[tokio::test]
    async fn cursor_resumes_and_terminates() {
        let store = seeded(4).await;
        let page = store
            .find_all(&PaginationRequest::new(Some(2), Some("key1".into())))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["key2", "key3"]);
        assert_eq!(page.last_key.as_deref(), Some("key3"));

        let page = store
            .find_all(&PaginationRequest::new(Some(10), Some("key2".into())))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["key3", "key4"]);
        assert_eq!(page.last_key, None);
    }

    #[tokio::test]
    async fn unknown_cursor_and_bad_size_are_ignored() {
        let store = seeded(2).await;
        let page = store
            .find_all(&PaginationRequest::new(Some(0), Some("wrongkey".into())))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["key1", "key2"]);
        assert_eq!(page.last_key, None);
    }

    #[tokio::test]
    async fn walking_every_page_visits_each_entry_once() {
        let store = seeded(7).await;
        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = store
                .find_all(&PaginationRequest::new(Some(3), cursor.clone()))
                .await
                .unwrap();
            seen.extend(page.items.into_iter().map(|e| e.id));
            match page.last_key {
                Some(key) => cursor = Some(key),
                None => break,
            }
        }
        let expected: Vec<String> = (1..=7).map(|i| format!("key{i}")).collect();
        assert_eq!(seen, expected);
    }
}
