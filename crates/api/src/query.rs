//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use salon_core::calendar::parse_date;
use salon_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;

/// `?date=YYYY-MM-DD`; today (salon-local) when absent.
#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}

impl DateParams {
    pub fn resolve(&self) -> AppResult<NaiveDate> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => Ok(parse_date(date)?),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }
}

/// `?search=` substring filter.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// `?client_id=` filter for listings that can span all clients.
#[derive(Debug, Deserialize)]
pub struct ClientFilter {
    pub client_id: Option<DbId>,
}
