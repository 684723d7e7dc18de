use std::sync::Arc;

use salon_core::blob::BlobStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: salon_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Storage for uploaded photos.
    pub blob_store: Arc<dyn BlobStore>,
}
