//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use chrono::NaiveDate;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Week listing: the data plus the Monday and Sunday it covers.
#[derive(Debug, Serialize)]
pub struct WeekResponse<T: Serialize> {
    pub data: T,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}
