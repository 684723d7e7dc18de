//! Client entity model and DTOs.

use salon_core::catalog::{normalize_optional, validate_person_name};
use salon_core::error::CoreError;
use salon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Id and name only, for select boxes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientOption {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
}

/// DTO for creating a new client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl CreateClient {
    /// Validate and trim in place.
    pub fn normalized(self) -> Result<Self, CoreError> {
        validate_person_name(&self.first_name, &self.last_name)?;
        Ok(Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: normalize_optional(self.phone),
            notes: normalize_optional(self.notes),
        })
    }
}

/// DTO for updating an existing client. All fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClient {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl UpdateClient {
    /// Reject names that are present but blank.
    pub fn normalized(self) -> Result<Self, CoreError> {
        for name in [&self.first_name, &self.last_name].into_iter().flatten() {
            if name.trim().is_empty() {
                return Err(CoreError::Validation(
                    "First name and last name are required".into(),
                ));
            }
        }
        Ok(Self {
            first_name: self.first_name.map(|n| n.trim().to_string()),
            last_name: self.last_name.map(|n| n.trim().to_string()),
            phone: self.phone.map(|p| p.trim().to_string()),
            notes: self.notes.map(|n| n.trim().to_string()),
        })
    }
}
