//! Handlers for the `/services` catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_db::models::service::{CreateService, UpdateService};
use salon_db::repositories::ServiceRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/services
pub async fn list_services(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let services = ServiceRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: services }))
}

/// GET /api/v1/services/active
pub async fn list_active_services(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let services = ServiceRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: services }))
}

/// GET /api/v1/services/{id}
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Service", &id))?;
    Ok(Json(DataResponse { data: service }))
}

/// POST /api/v1/services
///
/// `price` is either integer cents or a decimal string such as `"25.00"`.
pub async fn create_service(
    State(state): State<AppState>,
    Json(input): Json<CreateService>,
) -> AppResult<impl IntoResponse> {
    let input = input.validate()?;
    let service = ServiceRepo::create(&state.pool, &input).await?;

    tracing::info!(service_id = %service.id, price_cents = service.price_cents, "Service created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: service })))
}

/// PUT /api/v1/services/{id}
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateService>,
) -> AppResult<impl IntoResponse> {
    let changes = input.validate()?;
    let service = ServiceRepo::update(&state.pool, &id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Service", &id))?;
    Ok(Json(DataResponse { data: service }))
}

/// POST /api/v1/services/{id}/toggle
pub async fn toggle_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::toggle_active(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Service", &id))?;
    Ok(Json(DataResponse { data: service }))
}

/// DELETE /api/v1/services/{id}
///
/// Rejected with 422 while any appointment still links the service.
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !ServiceRepo::delete(&state.pool, &id).await? {
        return Err(AppError::not_found("Service", &id));
    }

    tracing::info!(service_id = %id, "Service deleted");

    Ok(StatusCode::NO_CONTENT)
}
