use axum::routing::get;
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Calendar grid routes mounted at `/calendar`.
///
/// ```text
/// GET /day     -> day_view (?date=)
/// GET /week    -> week_view (?date=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/day", get(calendar::day_view))
        .route("/week", get(calendar::week_view))
}
