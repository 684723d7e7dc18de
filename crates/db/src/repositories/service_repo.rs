//! Repository for the `services` catalog table.

use salon_core::catalog::service_in_use_message;
use salon_core::error::CoreError;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::service::{NewService, Service, ServiceChanges};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, price_cents, duration_minutes, active, created_at, updated_at";

/// Provides CRUD operations for catalog services.
pub struct ServiceRepo;

impl ServiceRepo {
    /// Insert a new service, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewService) -> Result<Service, sqlx::Error> {
        let query = format!(
            "INSERT INTO services (id, name, price_cents, duration_minutes, active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(&input.id)
            .bind(&input.name)
            .bind(input.price_cents)
            .bind(input.duration_minutes)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find a service by id.
    pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Service>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Services with the given ids, in no particular order.
    pub async fn find_many<'e, E>(executor: E, ids: &[String]) -> Result<Vec<Service>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = ANY($1)");
        sqlx::query_as::<_, Service>(&query)
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// List services by name, optionally only the active ones.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Service>, sqlx::Error> {
        let query = if active_only {
            format!("SELECT {COLUMNS} FROM services WHERE active = true ORDER BY name, id")
        } else {
            format!("SELECT {COLUMNS} FROM services ORDER BY active DESC, name, id")
        };
        sqlx::query_as::<_, Service>(&query).fetch_all(pool).await
    }

    /// Update a service. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        input: &ServiceChanges,
    ) -> Result<Option<Service>, sqlx::Error> {
        let query = format!(
            "UPDATE services SET \
                name = COALESCE($2, name), \
                price_cents = COALESCE($3, price_cents), \
                duration_minutes = COALESCE($4, duration_minutes), \
                active = COALESCE($5, active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.price_cents)
            .bind(input.duration_minutes)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Flip the `active` flag.
    pub async fn toggle_active(pool: &PgPool, id: &str) -> Result<Option<Service>, sqlx::Error> {
        let query =
            format!("UPDATE services SET active = NOT active WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of appointments linking the service.
    pub async fn count_links<'e, E>(executor: E, id: &str) -> Result<i64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM appointment_services WHERE service_id = $1")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(row.0)
    }

    /// Delete a service that no appointment links.
    ///
    /// Returns `Ok(false)` when the service does not exist and
    /// [`CoreError::Invariant`] naming the count while links remain.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(String,)> =
            sqlx::query_as("SELECT id FROM services WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let count = Self::count_links(&mut *tx, id).await?;
        if count > 0 {
            return Err(CoreError::Invariant(service_in_use_message(count)).into());
        }

        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
