//! Appointment overlap guard.
//!
//! Decides whether a proposed booking `(operator, start, duration)` collides
//! with an existing appointment of the same operator. Intervals are half-open,
//! `[start, start + duration)`, so back-to-back appointments do not conflict.

use chrono::Duration;
use serde::Serialize;

use crate::appointment::AppointmentStatus;
use crate::error::CoreError;
use crate::types::{DbId, LocalDateTime};

/// Wall-clock format used in conflict messages.
pub const CONFLICT_TIME_FORMAT: &str = "%H:%M";

/// A half-open wall-clock interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub starts_at: LocalDateTime,
    pub duration_minutes: i32,
}

impl TimeSlot {
    pub fn new(starts_at: LocalDateTime, duration_minutes: i32) -> Self {
        Self {
            starts_at,
            duration_minutes,
        }
    }

    pub fn ends_at(&self) -> LocalDateTime {
        self.starts_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// `self.start < other.end && self.end > other.start`.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.starts_at < other.ends_at() && self.ends_at() > other.starts_at
    }
}

/// An existing appointment as seen by the guard.
#[derive(Debug, Clone)]
pub struct BookedSlot {
    pub appointment_id: DbId,
    pub operator_id: String,
    pub client_last_name: String,
    pub status: AppointmentStatus,
    pub slot: TimeSlot,
}

/// Which existing appointments take part in conflict detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapPolicy {
    /// When `false` (the default), cancelled appointments free their slot.
    pub cancelled_blocks: bool,
}

impl OverlapPolicy {
    fn considers(&self, status: AppointmentStatus) -> bool {
        self.cancelled_blocks || status != AppointmentStatus::Cancelled
    }
}

/// A booking to be checked.
#[derive(Debug, Clone, Copy)]
pub struct BookingCandidate<'a> {
    pub operator_id: &'a str,
    pub slot: TimeSlot,
    /// The appointment being edited, which must not conflict with itself.
    pub exclude_appointment_id: Option<DbId>,
}

/// Outcome of a guard run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapCheck {
    pub has_conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_appointment_id: Option<DbId>,
}

impl OverlapCheck {
    pub fn clear() -> Self {
        Self {
            has_conflict: false,
            conflict_detail: None,
            conflicting_appointment_id: None,
        }
    }

    fn conflict_with(booking: &BookedSlot) -> Self {
        Self {
            has_conflict: true,
            conflict_detail: Some(conflict_detail(booking)),
            conflicting_appointment_id: Some(booking.appointment_id),
        }
    }

    /// Turn a detected conflict into [`CoreError::Conflict`].
    pub fn into_result(self) -> Result<(), CoreError> {
        match (self.has_conflict, self.conflict_detail) {
            (false, _) => Ok(()),
            (true, Some(detail)) => Err(CoreError::Conflict(detail)),
            (true, None) => Err(CoreError::Conflict(
                "Operator already has an appointment at this time".into(),
            )),
        }
    }
}

/// Human-readable description of the colliding appointment.
pub fn conflict_detail(booking: &BookedSlot) -> String {
    format!(
        "Operator already has an appointment with {} at {}",
        booking.client_last_name,
        booking.slot.starts_at.format(CONFLICT_TIME_FORMAT)
    )
}

/// Run the guard against `existing`.
///
/// Only bookings of the candidate's operator are considered. When several
/// collide, the earliest one (by start, then id) is reported.
pub fn check_overlap(
    candidate: &BookingCandidate<'_>,
    existing: &[BookedSlot],
    policy: OverlapPolicy,
) -> OverlapCheck {
    existing
        .iter()
        .filter(|b| b.operator_id == candidate.operator_id)
        .filter(|b| Some(b.appointment_id) != candidate.exclude_appointment_id)
        .filter(|b| policy.considers(b.status))
        .filter(|b| b.slot.overlaps(&candidate.slot))
        .min_by_key(|b| (b.slot.starts_at, b.appointment_id))
        .map(OverlapCheck::conflict_with)
        .unwrap_or_else(OverlapCheck::clear)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
