//! Handlers for the `/operators` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_db::models::operator::{CreateOperator, UpdateOperator};
use salon_db::repositories::OperatorRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/operators
///
/// Active operators first, then by last name.
pub async fn list_operators(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let operators = OperatorRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: operators }))
}

/// GET /api/v1/operators/active
pub async fn list_active_operators(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let operators = OperatorRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: operators }))
}

/// GET /api/v1/operators/{id}
pub async fn get_operator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let operator = OperatorRepo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Operator", &id))?;
    Ok(Json(DataResponse { data: operator }))
}

/// POST /api/v1/operators
pub async fn create_operator(
    State(state): State<AppState>,
    Json(input): Json<CreateOperator>,
) -> AppResult<impl IntoResponse> {
    let input = input.validate()?;
    let operator = OperatorRepo::create(&state.pool, &input).await?;

    tracing::info!(operator_id = %operator.id, "Operator created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: operator })))
}

/// PUT /api/v1/operators/{id}
pub async fn update_operator(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateOperator>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let operator = OperatorRepo::update(&state.pool, &id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Operator", &id))?;
    Ok(Json(DataResponse { data: operator }))
}

/// POST /api/v1/operators/{id}/toggle
pub async fn toggle_operator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let operator = OperatorRepo::toggle_active(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Operator", &id))?;

    tracing::info!(operator_id = %id, active = operator.active, "Operator toggled");

    Ok(Json(DataResponse { data: operator }))
}

/// DELETE /api/v1/operators/{id}
///
/// Rejected with 422 while the operator still has appointments.
pub async fn delete_operator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !OperatorRepo::delete(&state.pool, &id).await? {
        return Err(AppError::not_found("Operator", &id));
    }

    tracing::info!(operator_id = %id, "Operator deleted");

    Ok(StatusCode::NO_CONTENT)
}
