use axum::routing::get;
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Client routes mounted at `/clients`.
///
/// ```text
/// GET    /                        -> list_clients (?search=)
/// POST   /                        -> create_client
/// GET    /options                 -> list_client_options
/// GET    /{id}                    -> get_client
/// PUT    /{id}                    -> update_client
/// DELETE /{id}                    -> delete_client
/// GET    /{id}/appointments       -> list_client_appointments
/// GET    /{id}/photo-sessions     -> list_client_photo_sessions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(client::list_clients).post(client::create_client))
        .route("/options", get(client::list_client_options))
        .route(
            "/{id}",
            get(client::get_client)
                .put(client::update_client)
                .delete(client::delete_client),
        )
        .route("/{id}/appointments", get(client::list_client_appointments))
        .route("/{id}/photo-sessions", get(client::list_client_photo_sessions))
}
