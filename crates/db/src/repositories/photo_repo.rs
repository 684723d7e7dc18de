//! Repository for `photo_sessions` and `photos`.

use std::collections::HashMap;

use salon_core::error::CoreError;
use salon_core::photos::{validate_photo_slot, PhotoKind};
use salon_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::photo::{CreatePhotoSession, Photo, PhotoSession};

const PHOTO_COLUMNS: &str = "id, session_id, url, kind, position, created_at, updated_at";

const SESSION_SELECT: &str = "SELECT ps.id, ps.client_id, ps.operator_id, ps.service_id, \
        ps.session_date, ps.notes, ps.created_at, ps.updated_at, \
        o.first_name AS operator_first_name, o.last_name AS operator_last_name, \
        s.name AS service_name \
     FROM photo_sessions ps \
     JOIN operators o ON o.id = ps.operator_id \
     LEFT JOIN services s ON s.id = ps.service_id";

/// Provides operations for photo sessions and their photos.
pub struct PhotoRepo;

impl PhotoRepo {
    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Insert a new session, returning it with operator and service names.
    pub async fn create_session(
        pool: &PgPool,
        input: &CreatePhotoSession,
    ) -> Result<PhotoSession, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO photo_sessions (client_id, operator_id, service_id, session_date, notes) \
             VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5) \
             RETURNING id",
        )
        .bind(input.client_id)
        .bind(&input.operator_id)
        .bind(&input.service_id)
        .bind(input.session_date)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Self::find_session(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a session with its photos (before first, then by position).
    pub async fn find_session(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PhotoSession>, sqlx::Error> {
        let query = format!("{SESSION_SELECT} WHERE ps.id = $1");
        let found = sqlx::query_as::<_, PhotoSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match found {
            Some(session) => Ok(Self::with_photos(pool, vec![session]).await?.pop()),
            None => Ok(None),
        }
    }

    /// A client's sessions, newest first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<PhotoSession>, sqlx::Error> {
        let query = format!(
            "{SESSION_SELECT} WHERE ps.client_id = $1 \
             ORDER BY ps.session_date DESC, ps.id DESC"
        );
        let sessions = sqlx::query_as::<_, PhotoSession>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await?;
        Self::with_photos(pool, sessions).await
    }

    /// Replace the session notes. An empty string clears them.
    ///
    /// Returns `false` if no row with the given `id` exists.
    pub async fn update_notes(
        pool: &PgPool,
        id: DbId,
        notes: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE photo_sessions SET notes = NULLIF(btrim($2), '') WHERE id = $1")
            .bind(id)
            .bind(notes)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a session and its photos.
    ///
    /// Returns the URLs of the deleted photos so their blobs can be removed,
    /// or `None` if the session did not exist.
    pub async fn delete_session(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let urls: Vec<(String,)> = sqlx::query_as("SELECT url FROM photos WHERE session_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM photo_sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(urls.into_iter().map(|(url,)| url).collect()))
    }

    // -----------------------------------------------------------------------
    // Photos
    // -----------------------------------------------------------------------

    /// Number of photos of `kind` in a session.
    pub async fn count_photos(
        pool: &PgPool,
        session_id: DbId,
        kind: PhotoKind,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM photos WHERE session_id = $1 AND kind = $2")
                .bind(session_id)
                .bind(kind.as_str())
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Record an uploaded photo at the next position for its kind.
    ///
    /// The session row is locked so concurrent uploads cannot exceed the
    /// per-kind cap or collide on position.
    pub async fn add_photo(
        pool: &PgPool,
        session_id: DbId,
        kind: PhotoKind,
        url: &str,
    ) -> Result<Photo, DbError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM photo_sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(CoreError::not_found("PhotoSession", session_id).into());
        }

        let (count, max_position): (i64, Option<i32>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(position) FROM photos WHERE session_id = $1 AND kind = $2",
        )
        .bind(session_id)
        .bind(kind.as_str())
        .fetch_one(&mut *tx)
        .await?;
        validate_photo_slot(kind, usize::try_from(count).unwrap_or(usize::MAX))?;

        let query = format!(
            "INSERT INTO photos (session_id, url, kind, position) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PHOTO_COLUMNS}"
        );
        let photo = sqlx::query_as::<_, Photo>(&query)
            .bind(session_id)
            .bind(url)
            .bind(kind.as_str())
            .bind(max_position.unwrap_or(0) + 1)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(photo)
    }

    /// Delete a photo, returning the removed row.
    pub async fn delete_photo(pool: &PgPool, id: DbId) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("DELETE FROM photos WHERE id = $1 RETURNING {PHOTO_COLUMNS}");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    async fn with_photos(
        pool: &PgPool,
        sessions: Vec<PhotoSession>,
    ) -> Result<Vec<PhotoSession>, sqlx::Error> {
        if sessions.is_empty() {
            return Ok(sessions);
        }

        let ids: Vec<DbId> = sessions.iter().map(|s| s.id).collect();
        let query = format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE session_id = ANY($1) \
             ORDER BY session_id, (kind = 'after'), position"
        );
        let photos = sqlx::query_as::<_, Photo>(&query)
            .bind(&ids[..])
            .fetch_all(pool)
            .await?;

        let mut by_session: HashMap<DbId, Vec<Photo>> = HashMap::new();
        for photo in photos {
            by_session.entry(photo.session_id).or_default().push(photo);
        }

        Ok(sessions
            .into_iter()
            .map(|mut s| {
                s.photos = by_session.remove(&s.id).unwrap_or_default();
                s
            })
            .collect())
    }
}
