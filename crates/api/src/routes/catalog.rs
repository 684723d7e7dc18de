//! Route definitions for operators, services, products and service records.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{operator, product, service, service_record};
use crate::state::AppState;

/// Operator routes mounted at `/operators`.
///
/// ```text
/// GET    /               -> list_operators
/// POST   /               -> create_operator
/// GET    /active         -> list_active_operators
/// GET    /{id}           -> get_operator
/// PUT    /{id}           -> update_operator
/// DELETE /{id}           -> delete_operator
/// POST   /{id}/toggle    -> toggle_operator
/// ```
pub fn operators_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(operator::list_operators).post(operator::create_operator),
        )
        .route("/active", get(operator::list_active_operators))
        .route(
            "/{id}",
            get(operator::get_operator)
                .put(operator::update_operator)
                .delete(operator::delete_operator),
        )
        .route("/{id}/toggle", post(operator::toggle_operator))
}

/// Service catalog routes mounted at `/services`.
///
/// ```text
/// GET    /               -> list_services
/// POST   /               -> create_service
/// GET    /active         -> list_active_services
/// GET    /{id}           -> get_service
/// PUT    /{id}           -> update_service
/// DELETE /{id}           -> delete_service
/// POST   /{id}/toggle    -> toggle_service
/// ```
pub fn services_router() -> Router<AppState> {
    Router::new()
        .route("/", get(service::list_services).post(service::create_service))
        .route("/active", get(service::list_active_services))
        .route(
            "/{id}",
            get(service::get_service)
                .put(service::update_service)
                .delete(service::delete_service),
        )
        .route("/{id}/toggle", post(service::toggle_service))
}

/// Product routes mounted at `/products`.
pub fn products_router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list_products).post(product::create_product))
        .route(
            "/{id}",
            put(product::update_product).delete(product::delete_product),
        )
}

/// Service record routes mounted at `/service-records`.
pub fn service_records_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(service_record::list_service_records).post(service_record::create_service_record),
        )
        .route("/{id}", delete(service_record::delete_service_record))
}
