//! Repository for `appointments` and their `appointment_services` links.
//!
//! Booking writes run in a single transaction that first locks the
//! operator row, so two requests booking the same operator cannot both pass
//! the overlap check before either has written. Link edits lock the
//! appointment row instead.

use std::collections::HashMap;

use salon_core::appointment::{
    duration_after_adding, duration_after_removing, next_position, positions_for,
    validate_link_addition, validate_link_removal, AppointmentStatus,
};
use salon_core::calendar::DateBounds;
use salon_core::error::CoreError;
use salon_core::overlap::{check_overlap, BookedSlot, BookingCandidate, OverlapPolicy, TimeSlot};
use salon_core::types::DbId;
use sqlx::PgPool;

use super::{ClientRepo, OperatorRepo, ServiceRepo};
use crate::error::DbError;
use crate::models::appointment::{
    Appointment, AppointmentDetail, AppointmentServiceLine, BookedSlotRow, BookingRequest,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, client_id, operator_id, starts_at, duration_minutes, status, created_at, updated_at";

/// Appointment joined with client and operator names.
const DETAIL_SELECT: &str = "SELECT a.id, a.client_id, a.operator_id, a.starts_at, \
        a.duration_minutes, a.status, a.created_at, a.updated_at, \
        c.first_name AS client_first_name, c.last_name AS client_last_name, \
        c.phone AS client_phone, \
        o.first_name AS operator_first_name, o.last_name AS operator_last_name, \
        o.color_tag AS operator_color_tag \
     FROM appointments a \
     JOIN clients c ON c.id = a.client_id \
     JOIN operators o ON o.id = a.operator_id";

/// Service links joined with the catalog.
const LINE_SELECT: &str = "SELECT l.appointment_id, l.service_id, s.name, s.price_cents, \
        s.duration_minutes, l.position \
     FROM appointment_services l \
     JOIN services s ON s.id = l.service_id";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides booking, listing and link operations for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find an appointment row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an appointment with client, operator and ordered services.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppointmentDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE a.id = $1");
        let found = sqlx::query_as::<_, AppointmentDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match found {
            Some(detail) => Ok(Self::with_services(pool, vec![detail]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Appointments starting within `bounds` (inclusive), ascending by start.
    pub async fn list_in_range(
        pool: &PgPool,
        bounds: DateBounds,
    ) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE a.starts_at >= $1 AND a.starts_at <= $2 \
             ORDER BY a.starts_at, a.id"
        );
        let rows = sqlx::query_as::<_, AppointmentDetail>(&query)
            .bind(bounds.start)
            .bind(bounds.end)
            .fetch_all(pool)
            .await?;
        Self::with_services(pool, rows).await
    }

    /// A client's appointment history, newest first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE a.client_id = $1 \
             ORDER BY a.starts_at DESC, a.id DESC"
        );
        let rows = sqlx::query_as::<_, AppointmentDetail>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await?;
        Self::with_services(pool, rows).await
    }

    /// Load and attach service lines for a batch of appointments.
    async fn with_services(
        pool: &PgPool,
        appointments: Vec<AppointmentDetail>,
    ) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        if appointments.is_empty() {
            return Ok(appointments);
        }

        let ids: Vec<DbId> = appointments.iter().map(|a| a.id).collect();
        let query = format!(
            "{LINE_SELECT} WHERE l.appointment_id = ANY($1) \
             ORDER BY l.appointment_id, l.position"
        );
        let lines = sqlx::query_as::<_, AppointmentServiceLine>(&query)
            .bind(&ids[..])
            .fetch_all(pool)
            .await?;

        let mut by_appointment: HashMap<DbId, Vec<AppointmentServiceLine>> = HashMap::new();
        for line in lines {
            by_appointment
                .entry(line.appointment_id)
                .or_default()
                .push(line);
        }

        Ok(appointments
            .into_iter()
            .map(|a| {
                let services = by_appointment.remove(&a.id).unwrap_or_default();
                a.with_services(services)
            })
            .collect())
    }

    async fn require_detail(pool: &PgPool, id: DbId) -> Result<AppointmentDetail, DbError> {
        Self::find_detail(pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Appointment", id).into())
    }

    // -----------------------------------------------------------------------
    // Booking
    // -----------------------------------------------------------------------

    /// Book a new appointment after running the overlap guard.
    ///
    /// Fails with `NotFound` for an unknown client, operator or service and
    /// with `Conflict` when the operator is already busy. Nothing is written
    /// on failure.
    pub async fn create(
        pool: &PgPool,
        input: &BookingRequest,
        policy: OverlapPolicy,
    ) -> Result<AppointmentDetail, DbError> {
        let mut tx = pool.begin().await?;

        Self::check_booking(&mut tx, input, None, policy).await?;

        let query = format!(
            "INSERT INTO appointments \
                (client_id, operator_id, starts_at, duration_minutes, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(input.client_id)
            .bind(&input.operator_id)
            .bind(input.starts_at)
            .bind(input.duration_minutes)
            .bind(AppointmentStatus::default().as_str())
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_links(&mut tx, appointment.id, &input.service_ids).await?;

        tx.commit().await?;
        Self::require_detail(pool, appointment.id).await
    }

    /// Replace an appointment's client, operator, start, duration and
    /// services. The overlap guard ignores the appointment itself.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &BookingRequest,
        policy: OverlapPolicy,
    ) -> Result<AppointmentDetail, DbError> {
        let mut tx = pool.begin().await?;

        Self::lock(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Appointment", id))?;

        Self::check_booking(&mut tx, input, Some(id), policy).await?;

        sqlx::query(
            "UPDATE appointments SET \
                client_id = $2, operator_id = $3, starts_at = $4, duration_minutes = $5 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.client_id)
        .bind(&input.operator_id)
        .bind(input.starts_at)
        .bind(input.duration_minutes)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM appointment_services WHERE appointment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_links(&mut tx, id, &input.service_ids).await?;

        tx.commit().await?;
        Self::require_detail(pool, id).await
    }

    /// Lock the operator, confirm every referenced row exists and run the
    /// overlap guard against the operator's nearby bookings.
    async fn check_booking(
        tx: &mut Tx<'_>,
        input: &BookingRequest,
        exclude_appointment_id: Option<DbId>,
        policy: OverlapPolicy,
    ) -> Result<(), DbError> {
        OperatorRepo::lock(tx, &input.operator_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Operator", &input.operator_id))?;

        if !ClientRepo::exists(&mut **tx, input.client_id).await? {
            return Err(CoreError::not_found("Client", input.client_id).into());
        }

        let found = ServiceRepo::find_many(&mut **tx, &input.service_ids).await?;
        if let Some(missing) = input
            .service_ids
            .iter()
            .find(|id| !found.iter().any(|s| &s.id == *id))
        {
            return Err(CoreError::not_found("Service", missing).into());
        }

        let slot = input.slot();
        let existing = Self::booked_slots(tx, &input.operator_id, slot).await?;
        let candidate = BookingCandidate {
            operator_id: &input.operator_id,
            slot,
            exclude_appointment_id,
        };
        let check = check_overlap(&candidate, &existing, policy);
        if check.has_conflict {
            tracing::debug!(
                operator_id = %input.operator_id,
                starts_at = %slot.starts_at,
                conflicting_appointment_id = ?check.conflicting_appointment_id,
                "Booking rejected by overlap guard"
            );
        }
        check.into_result()?;
        Ok(())
    }

    /// The operator's appointments whose interval intersects `slot`.
    async fn booked_slots(
        tx: &mut Tx<'_>,
        operator_id: &str,
        slot: TimeSlot,
    ) -> Result<Vec<BookedSlot>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookedSlotRow>(
            "SELECT a.id, a.operator_id, c.last_name AS client_last_name, a.status, \
                    a.starts_at, a.duration_minutes \
             FROM appointments a \
             JOIN clients c ON c.id = a.client_id \
             WHERE a.operator_id = $1 \
               AND a.starts_at < $2 \
               AND a.starts_at + make_interval(mins => a.duration_minutes) > $3 \
             ORDER BY a.starts_at, a.id",
        )
        .bind(operator_id)
        .bind(slot.ends_at())
        .bind(slot.starts_at)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(BookedSlot::from).collect())
    }

    async fn insert_links(
        tx: &mut Tx<'_>,
        appointment_id: DbId,
        service_ids: &[String],
    ) -> Result<(), sqlx::Error> {
        for (service_id, position) in positions_for(service_ids) {
            sqlx::query(
                "INSERT INTO appointment_services (appointment_id, service_id, position) \
                 VALUES ($1, $2, $3)",
            )
            .bind(appointment_id)
            .bind(service_id)
            .bind(position)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Status and delete
    // -----------------------------------------------------------------------

    /// Set the status. Setting the current value is a no-op that still
    /// returns the row.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "UPDATE appointments SET status = $2 \
             WHERE id = $1 AND status <> $2 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await?;
        match updated {
            Some(row) => Ok(Some(row)),
            None => Self::find_by_id(pool, id).await,
        }
    }

    /// Hard delete. Links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Service links
    // -----------------------------------------------------------------------

    /// Append a service and extend the duration by the service's duration.
    pub async fn add_service(
        pool: &PgPool,
        appointment_id: DbId,
        service_id: &str,
    ) -> Result<AppointmentDetail, DbError> {
        let mut tx = pool.begin().await?;

        let appointment = Self::lock(&mut tx, appointment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Appointment", appointment_id))?;
        let service = ServiceRepo::find_by_id(&mut *tx, service_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Service", service_id))?;

        let links = Self::links(&mut tx, appointment_id).await?;
        let linked: Vec<String> = links.iter().map(|(id, _)| id.clone()).collect();
        validate_link_addition(&linked, service_id)?;

        let positions: Vec<i32> = links.iter().map(|(_, p)| *p).collect();
        sqlx::query(
            "INSERT INTO appointment_services (appointment_id, service_id, position) \
             VALUES ($1, $2, $3)",
        )
        .bind(appointment_id)
        .bind(service_id)
        .bind(next_position(&positions))
        .execute(&mut *tx)
        .await?;

        let duration = duration_after_adding(appointment.duration_minutes, service.duration_minutes);
        Self::set_duration(&mut tx, appointment_id, duration).await?;

        tx.commit().await?;
        Self::require_detail(pool, appointment_id).await
    }

    /// Remove a linked service and shorten the duration accordingly.
    ///
    /// The last remaining service cannot be removed.
    pub async fn remove_service(
        pool: &PgPool,
        appointment_id: DbId,
        service_id: &str,
    ) -> Result<AppointmentDetail, DbError> {
        let mut tx = pool.begin().await?;

        let appointment = Self::lock(&mut tx, appointment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Appointment", appointment_id))?;

        let links = Self::links(&mut tx, appointment_id).await?;
        let linked: Vec<String> = links.iter().map(|(id, _)| id.clone()).collect();
        validate_link_removal(appointment_id, &linked, service_id)?;

        let service = ServiceRepo::find_by_id(&mut *tx, service_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Service", service_id))?;

        sqlx::query(
            "DELETE FROM appointment_services WHERE appointment_id = $1 AND service_id = $2",
        )
        .bind(appointment_id)
        .bind(service_id)
        .execute(&mut *tx)
        .await?;

        let duration =
            duration_after_removing(appointment.duration_minutes, service.duration_minutes);
        Self::set_duration(&mut tx, appointment_id, duration).await?;

        tx.commit().await?;
        Self::require_detail(pool, appointment_id).await
    }

    /// Lock an appointment row for the rest of the transaction.
    async fn lock(tx: &mut Tx<'_>, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// `(service_id, position)` pairs of an appointment, by position.
    async fn links(tx: &mut Tx<'_>, appointment_id: DbId) -> Result<Vec<(String, i32)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT service_id, position FROM appointment_services \
             WHERE appointment_id = $1 ORDER BY position",
        )
        .bind(appointment_id)
        .fetch_all(&mut **tx)
        .await
    }

    async fn set_duration(tx: &mut Tx<'_>, id: DbId, minutes: i32) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE appointments SET duration_minutes = $2 WHERE id = $1")
            .bind(id)
            .bind(minutes)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
