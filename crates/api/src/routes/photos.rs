//! Route definitions for photo documentation.
//!
//! Two routers are provided:
//! - `sessions_router()` mounted at `/photo-sessions`
//! - `photos_router()` mounted at `/photos`

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::photo;
use crate::state::AppState;

/// ```text
/// POST   /                 -> create_session
/// GET    /{id}             -> get_session
/// DELETE /{id}             -> delete_session
/// PUT    /{id}/notes       -> update_notes
/// POST   /{id}/photos      -> upload_photos (multipart)
/// ```
pub fn sessions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(photo::create_session))
        .route(
            "/{id}",
            get(photo::get_session).delete(photo::delete_session),
        )
        .route("/{id}/notes", put(photo::update_notes))
        .route("/{id}/photos", post(photo::upload_photos))
}

/// ```text
/// DELETE /{id}             -> delete_photo
/// ```
pub fn photos_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(photo::delete_photo))
}
