//! Dashboard summary for the current salon day.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use salon_core::calendar::day_bounds;
use salon_core::dashboard::DailySummary;
use salon_db::repositories::AppointmentRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/today
///
/// Count, occupancy, revenue against the daily target and the next
/// appointment, computed against the server's local clock.
pub async fn today(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let now = chrono::Local::now().naive_local();
    let appointments = AppointmentRepo::list_in_range(&state.pool, day_bounds(now.date())).await?;
    let summary = DailySummary::compute(&appointments, now);
    Ok(Json(DataResponse { data: summary }))
}
