pub mod client;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod shared;
pub mod store;
pub mod ui;
pub mod validation;

pub use client::ApiClient;
pub use config::Config;
pub use error::AppError;
pub use proxy::{execute_request, HttpProxyService, ProxyRequest, ResponseEnvelope};
pub use routes::{router, AppState};
pub use store::{MemoryStore, SqliteStore, Storage};

use std::sync::Arc;

/// Picks the storage backend: SQLite when a database path is configured,
/// in-memory otherwise.
pub fn open_storage(config: &Config) -> store::Result<Arc<dyn Storage>> {
    match &config.database_path {
        Some(path) => {
            tracing::info!("Using SQLite storage at {}", path.display());
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        None => {
            tracing::info!("Using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// The application router wired with real storage and the HTTP proxy.
pub fn app(config: &Config) -> store::Result<axum::Router> {
    let storage = open_storage(config)?;
    Ok(router(AppState::new(storage, HttpProxyService::arc())))
}
