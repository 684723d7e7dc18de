//! Appointment status and service-link rules.
//!
//! An appointment owns an ordered list of service links. The list is never
//! empty, never references the same service twice, and positions are 1-based.
//! Status transitions are deliberately unrestricted: any of the three states
//! can move to any other, including back to `confirmed`.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, LocalDateTime};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// An appointment must keep at least this many linked services.
pub const MIN_SERVICES_PER_APPOINTMENT: usize = 1;

/// Upper bound on a single appointment's total duration (one full day).
pub const MAX_APPOINTMENT_MINUTES: i32 = 24 * 60;

/// Accepted wall-clock formats for `starts_at`, tried in order.
const WALL_CLOCK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Appointment lifecycle status, stored as lowercase text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [Self::Confirmed, Self::Completed, Self::Cancelled];

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from the database `status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: confirmed, completed, cancelled"
            ))),
        }
    }

    /// Whether the appointment's services count toward takings.
    pub fn counts_toward_revenue(self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }

    /// Every state may move to every other state. Kept as a function so a
    /// stricter table can be introduced in one place.
    pub fn can_transition_to(self, _target: AppointmentStatus) -> bool {
        true
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Booking input validation
// ---------------------------------------------------------------------------

/// Parse a wall-clock start such as `2024-01-08T10:00`.
pub fn parse_starts_at(input: &str) -> Result<LocalDateTime, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Start date and time are required".into()));
    }
    WALL_CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid start '{trimmed}'. Expected YYYY-MM-DDTHH:MM"
            ))
        })
}

/// Validate an appointment's total duration in minutes.
pub fn validate_duration(minutes: i32) -> Result<(), CoreError> {
    if minutes <= 0 {
        return Err(CoreError::Validation(
            "Duration must be a positive number of minutes".into(),
        ));
    }
    if minutes > MAX_APPOINTMENT_MINUTES {
        return Err(CoreError::Validation(format!(
            "Duration must not exceed {MAX_APPOINTMENT_MINUTES} minutes"
        )));
    }
    Ok(())
}

/// Validate the ordered service selection for a create or update.
pub fn validate_service_ids(service_ids: &[String]) -> Result<(), CoreError> {
    if service_ids.len() < MIN_SERVICES_PER_APPOINTMENT {
        return Err(CoreError::Validation(
            "At least one service is required".into(),
        ));
    }
    let mut seen = HashSet::with_capacity(service_ids.len());
    for id in service_ids {
        if id.trim().is_empty() {
            return Err(CoreError::Validation("Service id cannot be empty".into()));
        }
        if !seen.insert(id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Service '{id}' is selected more than once"
            )));
        }
    }
    Ok(())
}

/// Validate the scalar fields shared by create and update.
pub fn validate_booking(
    client_id: DbId,
    operator_id: &str,
    service_ids: &[String],
    duration_minutes: i32,
) -> Result<(), CoreError> {
    if client_id <= 0 {
        return Err(CoreError::Validation("Client is required".into()));
    }
    if operator_id.trim().is_empty() {
        return Err(CoreError::Validation("Operator is required".into()));
    }
    validate_service_ids(service_ids)?;
    validate_duration(duration_minutes)
}

// ---------------------------------------------------------------------------
// Service links
// ---------------------------------------------------------------------------

/// Assign 1-based positions in input order.
pub fn positions_for(service_ids: &[String]) -> Vec<(&str, i32)> {
    service_ids
        .iter()
        .zip(1..)
        .map(|(id, position)| (id.as_str(), position))
        .collect()
}

/// Position for a link appended after the existing ones.
pub fn next_position(existing: &[i32]) -> i32 {
    existing.iter().copied().max().unwrap_or(0) + 1
}

/// Reject adding a service that is already linked.
pub fn validate_link_addition(linked: &[String], service_id: &str) -> Result<(), CoreError> {
    if linked.iter().any(|id| id == service_id) {
        return Err(CoreError::Invariant(format!(
            "Service '{service_id}' is already part of this appointment"
        )));
    }
    Ok(())
}

/// Reject removing a service that is not linked, or the last remaining one.
pub fn validate_link_removal(
    appointment_id: DbId,
    linked: &[String],
    service_id: &str,
) -> Result<(), CoreError> {
    if !linked.iter().any(|id| id == service_id) {
        return Err(CoreError::NotFound {
            entity: "AppointmentService",
            id: format!("{appointment_id}/{service_id}"),
        });
    }
    if linked.len() <= MIN_SERVICES_PER_APPOINTMENT {
        return Err(CoreError::Invariant(
            "Cannot remove the last service of an appointment".into(),
        ));
    }
    Ok(())
}

/// Duration after adding a service. Saturates at the daily maximum.
pub fn duration_after_adding(current: i32, service_minutes: i32) -> i32 {
    current
        .saturating_add(service_minutes)
        .min(MAX_APPOINTMENT_MINUTES)
}

/// Duration after removing a service. Never drops below one minute, so a
/// hand-shortened appointment stays a valid slot.
pub fn duration_after_removing(current: i32, service_minutes: i32) -> i32 {
    current.saturating_sub(service_minutes).max(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
