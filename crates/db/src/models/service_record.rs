//! Service record ("what was done, with which products") model and DTOs.

use chrono::NaiveDate;
use salon_core::catalog::{require_text, validate_quantity};
use salon_core::error::CoreError;
use salon_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `service_records` row joined with the client's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRecord {
    pub id: DbId,
    pub client_id: DbId,
    pub description: String,
    pub performed_on: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub client_first_name: String,
    pub client_last_name: String,
    #[sqlx(skip)]
    pub products: Vec<ProductUsage>,
}

/// One product line of a service record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductUsage {
    pub service_record_id: DbId,
    pub product_id: DbId,
    pub product_name: String,
    pub price_cents: Cents,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductUsageInput {
    pub product_id: DbId,
    pub quantity: i32,
}

/// DTO for creating a service record. `performed_on` defaults to today.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRecord {
    pub client_id: DbId,
    pub description: String,
    pub performed_on: Option<NaiveDate>,
    #[serde(default)]
    pub products: Vec<ProductUsageInput>,
}

impl CreateServiceRecord {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.client_id <= 0 {
            return Err(CoreError::Validation("Client is required".into()));
        }
        require_text("Description", &self.description)?;
        for line in &self.products {
            validate_quantity(line.quantity)?;
        }
        Ok(())
    }
}
