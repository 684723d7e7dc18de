//! Calendar grids: day -> operator -> appointments.

use std::collections::BTreeSet;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use salon_core::calendar::{day_bounds, week_bounds, week_days, CalendarGrid, DateBounds};
use salon_db::models::appointment::AppointmentDetail;
use salon_db::models::operator::Operator;
use salon_db::repositories::{AppointmentRepo, OperatorRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::query::DateParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Column header for one operator.
#[derive(Debug, Serialize)]
pub struct OperatorHeader {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub color: String,
    pub active: bool,
}

impl From<&Operator> for OperatorHeader {
    fn from(op: &Operator) -> Self {
        Self {
            id: op.id.clone(),
            first_name: op.first_name.clone(),
            last_name: op.last_name.clone(),
            color: op.display_color().to_string(),
            active: op.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CalendarView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub operators: Vec<OperatorHeader>,
    #[serde(flatten)]
    pub grid: CalendarGrid<AppointmentDetail>,
}

/// GET /api/v1/calendar/day?date=YYYY-MM-DD
pub async fn day_view(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<impl IntoResponse> {
    let date = params.resolve()?;
    let view = build_view(&state, &[date], day_bounds(date)).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/calendar/week?date=YYYY-MM-DD
pub async fn week_view(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<impl IntoResponse> {
    let bounds = week_bounds(params.resolve()?);
    let days = week_days(bounds.start.date());
    let view = build_view(&state, &days, bounds).await?;
    Ok(Json(DataResponse { data: view }))
}

/// Columns are the active operators plus any inactive operator that still
/// has appointments in range.
async fn build_view(
    state: &AppState,
    days: &[NaiveDate],
    bounds: DateBounds,
) -> AppResult<CalendarView> {
    let appointments = AppointmentRepo::list_in_range(&state.pool, bounds).await?;
    let mut operators = OperatorRepo::list(&state.pool, true).await?;

    let known: BTreeSet<&str> = operators.iter().map(|o| o.id.as_str()).collect();
    let missing: Vec<String> = appointments
        .iter()
        .map(|a| a.operator_id.as_str())
        .filter(|id| !known.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        operators.extend(OperatorRepo::list_by_ids(&state.pool, &missing).await?);
    }

    let operator_ids: Vec<String> = operators.iter().map(|o| o.id.clone()).collect();
    let grid = CalendarGrid::build(days, &operator_ids, appointments);

    Ok(CalendarView {
        start: bounds.start.date(),
        end: bounds.end.date(),
        operators: operators.iter().map(OperatorHeader::from).collect(),
        grid,
    })
}
