use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::appointment;
use crate::state::AppState;

/// Appointment routes mounted at `/appointments`.
///
/// ```text
/// GET    /                              -> list_for_date (?date=)
/// POST   /                              -> create_appointment
/// GET    /week                          -> list_for_week (?date=)
/// GET    /{id}                          -> get_appointment
/// PUT    /{id}                          -> update_appointment
/// DELETE /{id}                          -> delete_appointment
/// PUT    /{id}/status                   -> update_status
/// POST   /{id}/services                 -> add_service
/// DELETE /{id}/services/{service_id}    -> remove_service
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(appointment::list_for_date).post(appointment::create_appointment),
        )
        .route("/week", get(appointment::list_for_week))
        .route(
            "/{id}",
            get(appointment::get_appointment)
                .put(appointment::update_appointment)
                .delete(appointment::delete_appointment),
        )
        .route("/{id}/status", put(appointment::update_status))
        .route("/{id}/services", post(appointment::add_service))
        .route(
            "/{id}/services/{service_id}",
            delete(appointment::remove_service),
        )
}
