#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use salon_api::config::{ServerConfig, DEFAULT_UPLOAD_MAX_BYTES};
use salon_api::router::build_app_router;
use salon_api::state::AppState;
use salon_core::blob::LocalBlobStore;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        cancelled_blocks_slot: false,
    }
}

/// Build the full application router, storing uploads under `upload_dir`.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app_with_uploads(pool: PgPool, upload_dir: &Path) -> Router {
    let config = test_config(upload_dir);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store: Arc::new(LocalBlobStore::new(upload_dir)),
    };
    build_app_router(state, &config)
}

/// Build the application for tests that never touch photo storage.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_uploads(pool, &std::env::temp_dir().join("salon-api-tests"))
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// POST a JSON body and return the `data` of a 201 response.
pub async fn create(app: Router, uri: &str, body: Value) -> Value {
    let response = post_json(app, uri, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"].clone()
}

/// Create a client and return its id.
pub async fn create_client(app: Router, first_name: &str, last_name: &str) -> i64 {
    let client = create(
        app,
        "/api/v1/clients",
        serde_json::json!({ "first_name": first_name, "last_name": last_name }),
    )
    .await;
    client["id"].as_i64().unwrap()
}
