//! Catalog service entity model and DTOs.

use salon_core::catalog::{
    require_text, resolve_text_id, validate_service, validate_service_duration,
    validate_service_price, SERVICE_ID_PREFIX,
};
use salon_core::error::CoreError;
use salon_core::money::PriceInput;
use salon_core::types::{Cents, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `services` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price_cents: Cents,
    pub duration_minutes: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new service. `id` is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateService {
    pub id: Option<String>,
    pub name: String,
    pub price: PriceInput,
    pub duration_minutes: i32,
    pub active: Option<bool>,
}

/// A validated service ready for insert.
#[derive(Debug, Clone)]
pub struct NewService {
    pub id: String,
    pub name: String,
    pub price_cents: Cents,
    pub duration_minutes: i32,
    pub active: bool,
}

impl CreateService {
    pub fn validate(self) -> Result<NewService, CoreError> {
        let price_cents = self.price.to_cents()?;
        validate_service(&self.name, price_cents, self.duration_minutes)?;
        Ok(NewService {
            id: resolve_text_id(SERVICE_ID_PREFIX, self.id.as_deref())?,
            name: self.name.trim().to_string(),
            price_cents,
            duration_minutes: self.duration_minutes,
            active: self.active.unwrap_or(true),
        })
    }
}

/// DTO for updating a service. All fields optional; id is immutable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateService {
    pub name: Option<String>,
    pub price: Option<PriceInput>,
    pub duration_minutes: Option<i32>,
    pub active: Option<bool>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub price_cents: Option<Cents>,
    pub duration_minutes: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateService {
    pub fn validate(self) -> Result<ServiceChanges, CoreError> {
        if let Some(name) = &self.name {
            require_text("Name", name)?;
        }
        let price_cents = self.price.as_ref().map(PriceInput::to_cents).transpose()?;
        if let Some(price) = price_cents {
            validate_service_price(price)?;
        }
        if let Some(minutes) = self.duration_minutes {
            validate_service_duration(minutes)?;
        }
        Ok(ServiceChanges {
            name: self.name.map(|n| n.trim().to_string()),
            price_cents,
            duration_minutes: self.duration_minutes,
            active: self.active,
        })
    }
}
