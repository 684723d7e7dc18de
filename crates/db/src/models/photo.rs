//! Photo session and photo models.

use chrono::NaiveDate;
use salon_core::catalog::normalize_optional;
use salon_core::error::CoreError;
use salon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `photo_sessions` row joined with operator and service names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PhotoSession {
    pub id: DbId,
    pub client_id: DbId,
    pub operator_id: String,
    pub service_id: Option<String>,
    pub session_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub operator_first_name: String,
    pub operator_last_name: String,
    pub service_name: Option<String>,
    #[sqlx(skip)]
    pub photos: Vec<Photo>,
}

/// A row from the `photos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Photo {
    pub id: DbId,
    pub session_id: DbId,
    pub url: String,
    pub kind: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a photo session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhotoSession {
    pub client_id: DbId,
    pub operator_id: String,
    pub service_id: Option<String>,
    pub session_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreatePhotoSession {
    pub fn normalized(self) -> Result<Self, CoreError> {
        if self.client_id <= 0 || self.operator_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "Client and operator are required".into(),
            ));
        }
        Ok(Self {
            client_id: self.client_id,
            operator_id: self.operator_id.trim().to_string(),
            service_id: normalize_optional(self.service_id),
            session_date: self.session_date,
            notes: normalize_optional(self.notes),
        })
    }
}

/// DTO for `PUT /photo-sessions/{id}/notes`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePhotoSessionNotes {
    pub notes: Option<String>,
}
