use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod assigner;
mod cache;
mod config;
mod engine;
mod errors;
mod handlers;
mod models;
mod pagination;
mod store;

use cache::EntryCache;
use config::StoreBackend;
use engine::{HashGenerator, RootHasher};
use store::{EntryStore, MemoryStore, SqliteStore};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub hasher: Arc<dyn RootHasher>,
    /// Read-through cache for id lookups. Safe without invalidation because
    /// entries never change after they are saved.
    pub cache: EntryCache,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>, hasher: Arc<dyn RootHasher>) -> Self {
        Self {
            store,
            hasher,
            cache: EntryCache::new(),
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check — returns 200 OK with no body
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .route(
            "/entries",
            get(handlers::entries::list_entries).post(handlers::entries::create_entry),
        )
        .route("/entries/", get(handlers::entries::get_entry))
        .route("/entries/:id", get(handlers::entries::get_entry))
        // Short-link redirect; static routes above take priority
        .route("/:id", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shrink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting shrink on {}", config.bind_addr());
    tracing::info!(
        "Root tokens: {:?}, {} chars",
        config.hash_strategy,
        config.hash_length
    );

    let store: Arc<dyn EntryStore> = match config.store_backend {
        StoreBackend::Sqlite => {
            tracing::info!("Using SQLite store at {}", config.database_url);
            Arc::new(SqliteStore::connect(&config.database_url, config.db_max_connections).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; entries are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let hasher = Arc::new(HashGenerator::new(config.hash_strategy, config.hash_length));

    let app = router(Arc::new(AppState::new(store, hasher)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
