//! Appointment entity model and DTOs.

use salon_core::appointment::{parse_starts_at, validate_booking, AppointmentStatus};
use salon_core::calendar::Scheduled;
use salon_core::dashboard::Billable;
use salon_core::error::CoreError;
use salon_core::money::sum_cents;
use salon_core::overlap::{BookedSlot, TimeSlot};
use salon_core::types::{Cents, DbId, LocalDateTime, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `appointments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub client_id: DbId,
    pub operator_id: String,
    pub starts_at: LocalDateTime,
    pub duration_minutes: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Appointment {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.starts_at, self.duration_minutes)
    }
}

/// A linked service joined with its catalog entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentServiceLine {
    pub appointment_id: DbId,
    pub service_id: String,
    pub name: String,
    pub price_cents: Cents,
    pub duration_minutes: i32,
    pub position: i32,
}

/// An appointment joined with its client and operator, plus its services
/// in position order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentDetail {
    pub id: DbId,
    pub client_id: DbId,
    pub operator_id: String,
    pub starts_at: LocalDateTime,
    pub duration_minutes: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub client_first_name: String,
    pub client_last_name: String,
    pub client_phone: Option<String>,
    pub operator_first_name: String,
    pub operator_last_name: String,
    pub operator_color_tag: Option<String>,
    #[sqlx(skip)]
    pub services: Vec<AppointmentServiceLine>,
    #[sqlx(skip)]
    pub total_price_cents: Cents,
}

impl AppointmentDetail {
    /// Attach service lines (already ordered by position) and total them.
    pub fn with_services(mut self, services: Vec<AppointmentServiceLine>) -> Self {
        self.total_price_cents = sum_cents(services.iter().map(|s| s.price_cents));
        self.services = services;
        self
    }
}

impl Scheduled for AppointmentDetail {
    fn starts_at(&self) -> LocalDateTime {
        self.starts_at
    }

    fn operator_id(&self) -> &str {
        &self.operator_id
    }
}

impl Billable for AppointmentDetail {
    fn status(&self) -> AppointmentStatus {
        // The column is CHECK-constrained to the three known values.
        AppointmentStatus::from_name(&self.status).unwrap_or_default()
    }

    fn total_price_cents(&self) -> Cents {
        self.total_price_cents
    }

    fn client_last_name(&self) -> &str {
        &self.client_last_name
    }
}

/// An existing booking as loaded for the overlap guard.
#[derive(Debug, Clone, FromRow)]
pub struct BookedSlotRow {
    pub id: DbId,
    pub operator_id: String,
    pub client_last_name: String,
    pub status: String,
    pub starts_at: LocalDateTime,
    pub duration_minutes: i32,
}

impl From<BookedSlotRow> for BookedSlot {
    fn from(row: BookedSlotRow) -> Self {
        BookedSlot {
            appointment_id: row.id,
            operator_id: row.operator_id,
            client_last_name: row.client_last_name,
            status: AppointmentStatus::from_name(&row.status).unwrap_or_default(),
            slot: TimeSlot::new(row.starts_at, row.duration_minutes),
        }
    }
}

/// Request body for creating or fully replacing an appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentInput {
    pub client_id: DbId,
    pub operator_id: String,
    /// Wall-clock start, e.g. `2024-01-08T10:00`.
    pub starts_at: String,
    /// Ordered; position follows this order.
    pub service_ids: Vec<String>,
    pub duration_minutes: i32,
}

/// A validated booking.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub client_id: DbId,
    pub operator_id: String,
    pub starts_at: LocalDateTime,
    pub service_ids: Vec<String>,
    pub duration_minutes: i32,
}

impl BookingRequest {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.starts_at, self.duration_minutes)
    }
}

impl AppointmentInput {
    pub fn validate(self) -> Result<BookingRequest, CoreError> {
        let operator_id = self.operator_id.trim().to_string();
        let service_ids: Vec<String> = self
            .service_ids
            .iter()
            .map(|id| id.trim().to_string())
            .collect();
        validate_booking(self.client_id, &operator_id, &service_ids, self.duration_minutes)?;
        Ok(BookingRequest {
            client_id: self.client_id,
            operator_id,
            starts_at: parse_starts_at(&self.starts_at)?,
            service_ids,
            duration_minutes: self.duration_minutes,
        })
    }
}

/// Request body for `PUT /appointments/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentStatus {
    pub status: String,
}

impl UpdateAppointmentStatus {
    pub fn parse(&self) -> Result<AppointmentStatus, CoreError> {
        AppointmentStatus::from_name(self.status.trim())
    }
}

/// Request body for `POST /appointments/{id}/services`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddAppointmentService {
    pub service_id: String,
}
