//! Retail / back-bar product entity model and DTOs.

use salon_core::catalog::{
    normalize_optional, require_text, validate_product, validate_product_price,
};
use salon_core::error::CoreError;
use salon_core::money::PriceInput;
use salon_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Cents,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: PriceInput,
}

/// DTO for updating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
}

/// Validated product fields. Used for both insert and update.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<Cents>,
}

impl CreateProduct {
    pub fn validate(self) -> Result<ProductFields, CoreError> {
        let price_cents = self.price.to_cents()?;
        validate_product(&self.name, price_cents)?;
        Ok(ProductFields {
            name: Some(self.name.trim().to_string()),
            description: normalize_optional(self.description),
            price_cents: Some(price_cents),
        })
    }
}

impl UpdateProduct {
    pub fn validate(self) -> Result<ProductFields, CoreError> {
        if let Some(name) = &self.name {
            require_text("Name", name)?;
        }
        let price_cents = self.price.as_ref().map(PriceInput::to_cents).transpose()?;
        if let Some(price) = price_cents {
            validate_product_price(price)?;
        }
        Ok(ProductFields {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            price_cents,
        })
    }
}
