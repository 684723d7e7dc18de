//! Repository for the `operators` table.

use salon_core::catalog::operator_in_use_message;
use salon_core::error::CoreError;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::operator::{NewOperator, Operator, UpdateOperator};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, color_tag, active, created_at, updated_at";

/// Active operators first, then alphabetical.
const ORDER: &str = "ORDER BY active DESC, last_name, first_name, id";

/// Provides CRUD operations for operators.
pub struct OperatorRepo;

impl OperatorRepo {
    /// Insert a new operator, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewOperator) -> Result<Operator, sqlx::Error> {
        let query = format!(
            "INSERT INTO operators (id, first_name, last_name, color_tag, active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Operator>(&query)
            .bind(&input.id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.color_tag)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Find an operator by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Operator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operators WHERE id = $1");
        sqlx::query_as::<_, Operator>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List operators, optionally only the active ones.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Operator>, sqlx::Error> {
        let query = if active_only {
            format!("SELECT {COLUMNS} FROM operators WHERE active = true {ORDER}")
        } else {
            format!("SELECT {COLUMNS} FROM operators {ORDER}")
        };
        sqlx::query_as::<_, Operator>(&query).fetch_all(pool).await
    }

    /// Operators with the given ids, in the usual listing order.
    pub async fn list_by_ids(pool: &PgPool, ids: &[String]) -> Result<Vec<Operator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operators WHERE id = ANY($1) {ORDER}");
        sqlx::query_as::<_, Operator>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Update an operator. Only non-`None` fields are applied; a blank
    /// `color_tag` clears the colour back to the default.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        input: &UpdateOperator,
    ) -> Result<Option<Operator>, sqlx::Error> {
        let query = format!(
            "UPDATE operators SET \
                first_name = COALESCE(btrim($2), first_name), \
                last_name = COALESCE(btrim($3), last_name), \
                color_tag = CASE WHEN $4::text IS NULL THEN color_tag ELSE NULLIF(btrim($4), '') END, \
                active = COALESCE($5, active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Operator>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.color_tag)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Flip the `active` flag.
    pub async fn toggle_active(pool: &PgPool, id: &str) -> Result<Option<Operator>, sqlx::Error> {
        let query =
            format!("UPDATE operators SET active = NOT active WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Operator>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of appointments (any status) assigned to the operator.
    pub async fn count_appointments<'e, E>(executor: E, id: &str) -> Result<i64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE operator_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Lock the operator row for the rest of the transaction.
    ///
    /// Bookings for the same operator serialise on this lock.
    pub async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: &str,
    ) -> Result<Option<Operator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operators WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Operator>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete an operator that has no appointments.
    ///
    /// Returns `Ok(false)` when the operator does not exist and
    /// [`CoreError::Invariant`] naming the count when appointments remain.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if Self::lock(&mut tx, id).await?.is_none() {
            return Ok(false);
        }

        let count = Self::count_appointments(&mut *tx, id).await?;
        if count > 0 {
            return Err(CoreError::Invariant(operator_in_use_message(count)).into());
        }

        sqlx::query("DELETE FROM operators WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
