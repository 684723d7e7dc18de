//! Repository for the `clients` table.

use salon_core::types::DbId;
use sqlx::PgPool;

use super::like_pattern;
use crate::models::client::{Client, ClientOption, CreateClient, UpdateClient};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, phone, notes, created_at, updated_at";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a new client, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (first_name, last_name, phone, notes) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.phone)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a client by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List clients ordered by last name, then first name.
    ///
    /// With `search`, only clients whose first or last name contains the term
    /// (case-insensitive) are returned.
    pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<Client>, sqlx::Error> {
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM clients \
                     WHERE first_name ILIKE $1 OR last_name ILIKE $1 \
                     ORDER BY last_name, first_name, id"
                );
                sqlx::query_as::<_, Client>(&query)
                    .bind(like_pattern(term))
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM clients ORDER BY last_name, first_name, id");
                sqlx::query_as::<_, Client>(&query).fetch_all(pool).await
            }
        }
    }

    /// Id and name of every client, for select boxes.
    pub async fn list_options(pool: &PgPool) -> Result<Vec<ClientOption>, sqlx::Error> {
        sqlx::query_as::<_, ClientOption>(
            "SELECT id, first_name, last_name FROM clients ORDER BY last_name, first_name, id",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a client. Only non-`None` fields are applied; an empty phone
    /// or notes string clears the field.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                phone = CASE WHEN $4::text IS NULL THEN phone ELSE NULLIF($4, '') END, \
                notes = CASE WHEN $5::text IS NULL THEN notes ELSE NULLIF($5, '') END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.phone)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a client. Appointments, service records and photo sessions
    /// cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a client with this id exists.
    pub async fn exists<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}
