//! Liveness and readiness for the salon API.
//!
//! The service is `ok` only when both the database answers and the photo
//! upload directory exists; otherwise it reports `degraded` with the failing
//! part flagged.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the configured upload directory is present.
    pub uploads_ready: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = salon_db::health_check(&state.pool).await.is_ok();
    let uploads_ready = tokio::fs::metadata(&state.config.upload_dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    if !uploads_ready {
        tracing::warn!(
            upload_dir = %state.config.upload_dir.display(),
            "Upload directory is missing"
        );
    }

    let status = if db_healthy && uploads_ready { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        uploads_ready,
    })
}

/// Root-level health routes, mounted outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
