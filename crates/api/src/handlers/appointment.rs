//! Handlers for the `/appointments` resource.
//!
//! Writes go through the transactional booking path in
//! [`AppointmentRepo`], which locks the operator row and runs the overlap
//! guard before anything is written.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_core::calendar::{day_bounds, week_bounds};
use salon_core::types::DbId;
use salon_db::models::appointment::{
    AddAppointmentService, AppointmentInput, UpdateAppointmentStatus,
};
use salon_db::repositories::AppointmentRepo;

use crate::error::{AppError, AppResult};
use crate::query::DateParams;
use crate::response::{DataResponse, WeekResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments?date=YYYY-MM-DD
///
/// One day's appointments, ascending by start.
pub async fn list_for_date(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<impl IntoResponse> {
    let date = params.resolve()?;
    let appointments = AppointmentRepo::list_in_range(&state.pool, day_bounds(date)).await?;
    Ok(Json(DataResponse { data: appointments }))
}

/// GET /api/v1/appointments/week?date=YYYY-MM-DD
///
/// Monday through Sunday of the week containing `date`.
pub async fn list_for_week(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<impl IntoResponse> {
    let anchor = params.resolve()?;
    let bounds = week_bounds(anchor);
    let appointments = AppointmentRepo::list_in_range(&state.pool, bounds).await?;
    Ok(Json(WeekResponse {
        data: appointments,
        week_start: bounds.start.date(),
        week_end: bounds.end.date(),
    }))
}

/// GET /api/v1/appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let appointment = AppointmentRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))?;
    Ok(Json(DataResponse { data: appointment }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments
///
/// 409 when the operator is already booked in an overlapping slot.
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(input): Json<AppointmentInput>,
) -> AppResult<impl IntoResponse> {
    let request = input.validate()?;
    let appointment =
        AppointmentRepo::create(&state.pool, &request, state.config.overlap_policy()).await?;

    tracing::info!(
        appointment_id = appointment.id,
        operator_id = %appointment.operator_id,
        starts_at = %appointment.starts_at,
        duration_minutes = appointment.duration_minutes,
        "Appointment created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: appointment })))
}

/// PUT /api/v1/appointments/{id}
///
/// Replaces client, operator, start, duration and the service list. The
/// appointment never conflicts with itself.
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AppointmentInput>,
) -> AppResult<impl IntoResponse> {
    let request = input.validate()?;
    let appointment =
        AppointmentRepo::update(&state.pool, id, &request, state.config.overlap_policy()).await?;

    tracing::info!(
        appointment_id = id,
        operator_id = %appointment.operator_id,
        starts_at = %appointment.starts_at,
        "Appointment updated"
    );

    Ok(Json(DataResponse { data: appointment }))
}

/// PUT /api/v1/appointments/{id}/status
///
/// Any of `confirmed`, `completed`, `cancelled`; setting the current value
/// is a no-op.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAppointmentStatus>,
) -> AppResult<impl IntoResponse> {
    let status = input.parse()?;
    let appointment = AppointmentRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))?;

    tracing::info!(appointment_id = id, status = %status, "Appointment status set");

    Ok(Json(DataResponse { data: appointment }))
}

/// DELETE /api/v1/appointments/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !AppointmentRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Appointment", id));
    }

    tracing::info!(appointment_id = id, "Appointment deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Service links
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments/{id}/services
///
/// Appends a service and extends the duration by the service's length.
pub async fn add_service(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddAppointmentService>,
) -> AppResult<impl IntoResponse> {
    let service_id = input.service_id.trim();
    if service_id.is_empty() {
        return Err(AppError::BadRequest("service_id is required".into()));
    }
    let appointment = AppointmentRepo::add_service(&state.pool, id, service_id).await?;

    tracing::info!(
        appointment_id = id,
        service_id,
        duration_minutes = appointment.duration_minutes,
        "Service added to appointment"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: appointment })))
}

/// DELETE /api/v1/appointments/{id}/services/{service_id}
///
/// The last remaining service cannot be removed.
pub async fn remove_service(
    State(state): State<AppState>,
    Path((id, service_id)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let appointment = AppointmentRepo::remove_service(&state.pool, id, &service_id).await?;

    tracing::info!(
        appointment_id = id,
        service_id = %service_id,
        duration_minutes = appointment.duration_minutes,
        "Service removed from appointment"
    );

    Ok(Json(DataResponse { data: appointment }))
}
