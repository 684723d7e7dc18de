//! Handlers for the `/clients` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_core::types::DbId;
use salon_db::models::client::{CreateClient, UpdateClient};
use salon_db::repositories::{AppointmentRepo, ClientRepo, PhotoRepo};

use crate::error::{AppError, AppResult};
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/clients?search=
///
/// All clients by last name, optionally filtered by a name substring.
pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let search = params.search.as_deref().filter(|s| !s.trim().is_empty());
    let clients = ClientRepo::list(&state.pool, search).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// GET /api/v1/clients/options
pub async fn list_client_options(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let options = ClientRepo::list_options(&state.pool).await?;
    Ok(Json(DataResponse { data: options }))
}

/// GET /api/v1/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))?;
    Ok(Json(DataResponse { data: client }))
}

/// POST /api/v1/clients
pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<CreateClient>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized()?;
    let client = ClientRepo::create(&state.pool, &input).await?;

    tracing::info!(client_id = client.id, "Client created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

/// PUT /api/v1/clients/{id}
///
/// Absent fields are left unchanged; an empty phone or notes clears it.
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClient>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized()?;
    let client = ClientRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))?;
    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/v1/clients/{id}
///
/// Cascades to the client's appointments, service records and photo
/// sessions.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ClientRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Client", id));
    }

    tracing::info!(client_id = id, "Client deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/clients/{id}/appointments
///
/// The client's appointment history, newest first.
pub async fn list_client_appointments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_client(&state, id).await?;
    let appointments = AppointmentRepo::list_for_client(&state.pool, id).await?;
    Ok(Json(DataResponse { data: appointments }))
}

/// GET /api/v1/clients/{id}/photo-sessions
pub async fn list_client_photo_sessions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_client(&state, id).await?;
    let sessions = PhotoRepo::list_for_client(&state.pool, id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

async fn ensure_client(state: &AppState, id: DbId) -> AppResult<()> {
    if ClientRepo::exists(&state.pool, id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Client", id))
    }
}
