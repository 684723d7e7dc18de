//! Handlers for photo sessions and before/after photos.
//!
//! Uploaded images are compressed on the blocking pool, written through the
//! [`BlobStore`](salon_core::blob::BlobStore) and then recorded. A blob whose
//! row could not be written is removed again.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salon_core::error::CoreError;
use salon_core::photos::{
    compress_image, photo_filename, validate_photo_slot, PhotoKind, COMPRESS_JPEG_QUALITY,
    COMPRESS_MAX_WIDTH,
};
use salon_core::types::DbId;
use salon_db::models::photo::{CreatePhotoSession, Photo, UpdatePhotoSessionNotes};
use salon_db::repositories::PhotoRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// GET /api/v1/photo-sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let session = PhotoRepo::find_session(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PhotoSession", id))?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/photo-sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(input): Json<CreatePhotoSession>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized()?;
    let session = PhotoRepo::create_session(&state.pool, &input).await?;

    tracing::info!(
        session_id = session.id,
        client_id = session.client_id,
        operator_id = %session.operator_id,
        "Photo session created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// PUT /api/v1/photo-sessions/{id}/notes
pub async fn update_notes(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePhotoSessionNotes>,
) -> AppResult<impl IntoResponse> {
    if !PhotoRepo::update_notes(&state.pool, id, input.notes.as_deref()).await? {
        return Err(AppError::not_found("PhotoSession", id));
    }
    let session = PhotoRepo::find_session(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PhotoSession", id))?;
    Ok(Json(DataResponse { data: session }))
}

/// DELETE /api/v1/photo-sessions/{id}
///
/// Deletes the session and its photos, then removes the stored files.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let urls = PhotoRepo::delete_session(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PhotoSession", id))?;

    for url in &urls {
        remove_blob(&state, url).await;
    }

    tracing::info!(session_id = id, photos = urls.len(), "Photo session deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Photos
// ---------------------------------------------------------------------------

/// Outcome of a multi-file upload.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<Photo>,
    pub failed: Vec<UploadFailure>,
}

#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub filename: String,
    pub error: String,
}

/// POST /api/v1/photo-sessions/{id}/photos
///
/// Multipart form with a `kind` field (`before` or `after`) and one or more
/// `file` fields. Files are processed in order; one failing does not undo
/// the ones already stored. If nothing could be stored the first error is
/// returned as the response.
pub async fn upload_photos(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut kind: Option<PhotoKind> = None;
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "kind" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                kind = Some(PhotoKind::from_name(&text)?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                files.push((filename, data.to_vec()));
            }
            _ => {} // ignore unknown fields
        }
    }

    let kind = kind.ok_or_else(|| AppError::BadRequest("Missing required 'kind' field".into()))?;
    if files.is_empty() {
        return Err(AppError::BadRequest("Missing required 'file' field".into()));
    }

    PhotoRepo::find_session(&state.pool, session_id)
        .await?
        .ok_or_else(|| AppError::not_found("PhotoSession", session_id))?;

    let mut report = UploadReport {
        uploaded: Vec::new(),
        failed: Vec::new(),
    };
    let mut first_error: Option<AppError> = None;

    for (seq, (filename, bytes)) in files.into_iter().enumerate() {
        match store_photo(&state, session_id, kind, seq, bytes).await {
            Ok(photo) => {
                tracing::info!(session_id, photo_id = photo.id, kind = %kind, "Photo stored");
                report.uploaded.push(photo);
            }
            Err(err) => {
                tracing::warn!(session_id, filename = %filename, error = %err, "Photo upload failed");
                report.failed.push(UploadFailure {
                    filename,
                    error: public_message(&err),
                });
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    if report.uploaded.is_empty() {
        if let Some(err) = first_error {
            return Err(err);
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// DELETE /api/v1/photos/{id}
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let photo = PhotoRepo::delete_photo(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Photo", id))?;

    remove_blob(&state, &photo.url).await;

    tracing::info!(photo_id = id, session_id = photo.session_id, "Photo deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Compress, store and record a single photo.
async fn store_photo(
    state: &AppState,
    session_id: DbId,
    kind: PhotoKind,
    seq: usize,
    bytes: Vec<u8>,
) -> AppResult<Photo> {
    // Fail fast before spending time on the image; `add_photo` re-checks
    // under the session lock.
    let existing = PhotoRepo::count_photos(&state.pool, session_id, kind).await?;
    validate_photo_slot(kind, usize::try_from(existing).unwrap_or(usize::MAX))?;

    let compressed = tokio::task::spawn_blocking(move || {
        compress_image(&bytes, COMPRESS_MAX_WIDTH, COMPRESS_JPEG_QUALITY)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Compression task failed: {e}")))??;

    let filename = photo_filename(chrono::Utc::now(), seq);
    let url = state
        .blob_store
        .store(compressed, &filename)
        .await
        .map_err(CoreError::from)?;

    match PhotoRepo::add_photo(&state.pool, session_id, kind, &url).await {
        Ok(photo) => Ok(photo),
        Err(err) => {
            remove_blob(state, &url).await;
            Err(err.into())
        }
    }
}

/// Best-effort blob removal; failures are logged, never returned.
async fn remove_blob(state: &AppState, url: &str) {
    if let Err(e) = state.blob_store.remove(url).await {
        tracing::warn!(url, error = %e, "Failed to remove stored photo");
    }
}

/// Message safe to echo back for a failed file.
fn public_message(err: &AppError) -> String {
    match err {
        AppError::Core(CoreError::Internal(_))
        | AppError::Database(_)
        | AppError::InternalError(_) => "An internal error occurred".to_string(),
        other => other.to_string(),
    }
}
