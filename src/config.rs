use std::str::FromStr;

use anyhow::{Context, Result};

use crate::engine::{HashStrategy, MAX_HASH_LENGTH};

/// Which `EntryStore` implementation the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown store backend '{other}' (expected 'sqlite' or 'memory')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub store_backend: StoreBackend,

    /// SQLite connection string, e.g. "sqlite:./shrink.db". Ignored by the
    /// memory backend.
    pub database_url: String,

    pub db_max_connections: u32,

    /// How root tokens are derived from URLs
    pub hash_strategy: HashStrategy,

    /// Root token length, before the collision suffix
    pub hash_length: usize,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = get("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let store_backend = get("STORE_BACKEND")
            .unwrap_or_else(|| "sqlite".into())
            .parse::<StoreBackend>()
            .context("STORE_BACKEND is invalid")?;

        let db_max_connections = get("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".into())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a positive integer")?;
        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        let hash_strategy = get("HASH_STRATEGY")
            .unwrap_or_else(|| "digest".into())
            .parse::<HashStrategy>()
            .context("HASH_STRATEGY is invalid")?;

        let hash_length = get("HASH_LENGTH")
            .unwrap_or_else(|| "6".into())
            .parse::<usize>()
            .context("HASH_LENGTH must be a positive integer")?;
        if !(1..=MAX_HASH_LENGTH).contains(&hash_length) {
            anyhow::bail!("HASH_LENGTH must be between 1 and {MAX_HASH_LENGTH}");
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            store_backend,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite:./shrink.db".into()),
            db_max_connections,
            hash_strategy,
            hash_length,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
