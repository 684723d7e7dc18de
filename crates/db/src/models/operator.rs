//! Operator (stylist) entity model and DTOs.

use salon_core::catalog::{
    display_color, normalize_optional, resolve_text_id, validate_color_tag, validate_person_name,
    OPERATOR_ID_PREFIX,
};
use salon_core::error::CoreError;
use salon_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `operators` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Operator {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub color_tag: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Operator {
    pub fn display_color(&self) -> &str {
        display_color(self.color_tag.as_deref())
    }
}

/// DTO for creating a new operator. `id` is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOperator {
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub color_tag: Option<String>,
    pub active: Option<bool>,
}

/// A validated operator ready for insert.
#[derive(Debug, Clone)]
pub struct NewOperator {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub color_tag: Option<String>,
    pub active: bool,
}

impl CreateOperator {
    /// Validate, trim and resolve the id.
    pub fn validate(self) -> Result<NewOperator, CoreError> {
        validate_person_name(&self.first_name, &self.last_name)?;
        let color_tag = normalize_optional(self.color_tag);
        validate_color_tag(color_tag.as_deref())?;
        Ok(NewOperator {
            id: resolve_text_id(OPERATOR_ID_PREFIX, self.id.as_deref())?,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            color_tag,
            active: self.active.unwrap_or(true),
        })
    }
}

/// DTO for updating an existing operator. All fields optional; id is immutable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOperator {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub color_tag: Option<String>,
    pub active: Option<bool>,
}

impl UpdateOperator {
    pub fn validate(&self) -> Result<(), CoreError> {
        for name in [&self.first_name, &self.last_name].into_iter().flatten() {
            if name.trim().is_empty() {
                return Err(CoreError::Validation(
                    "First name and last name are required".into(),
                ));
            }
        }
        // An empty colour means "reset to the default".
        let color = self.color_tag.as_deref().map(str::trim).filter(|c| !c.is_empty());
        validate_color_tag(color)
    }
}
