//! Handlers for `/service-records` (work done on a client, with the
//! products used).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_core::types::DbId;
use salon_db::models::service_record::CreateServiceRecord;
use salon_db::repositories::ServiceRecordRepo;

use crate::error::{AppError, AppResult};
use crate::query::ClientFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/service-records?client_id=
pub async fn list_service_records(
    State(state): State<AppState>,
    Query(filter): Query<ClientFilter>,
) -> AppResult<impl IntoResponse> {
    let records = ServiceRecordRepo::list(&state.pool, filter.client_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/service-records
pub async fn create_service_record(
    State(state): State<AppState>,
    Json(input): Json<CreateServiceRecord>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let record = ServiceRecordRepo::create(&state.pool, &input).await?;

    tracing::info!(
        service_record_id = record.id,
        client_id = record.client_id,
        products = record.products.len(),
        "Service record created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// DELETE /api/v1/service-records/{id}
pub async fn delete_service_record(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ServiceRecordRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("ServiceRecord", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
