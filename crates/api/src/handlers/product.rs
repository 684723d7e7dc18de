//! Handlers for the `/products` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_core::types::DbId;
use salon_db::models::product::{CreateProduct, UpdateProduct};
use salon_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/products
pub async fn list_products(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let products = ProductRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: products }))
}

/// POST /api/v1/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<impl IntoResponse> {
    let fields = input.validate()?;
    let product = ProductRepo::create(&state.pool, &fields).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// PUT /api/v1/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<impl IntoResponse> {
    let fields = input.validate()?;
    let product = ProductRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ProductRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Product", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
