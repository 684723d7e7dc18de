//! Repository for the `products` table.

use salon_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{Product, ProductFields};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, price_cents, created_at, updated_at";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    ///
    /// `input` comes from [`CreateProduct::validate`](crate::models::product::CreateProduct::validate),
    /// so name and price are present.
    pub async fn create(pool: &PgPool, input: &ProductFields) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, description, price_cents) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all products by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY name, id");
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Update a product. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProductFields,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                price_cents = COALESCE($4, price_cents) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Fails with a foreign-key violation while a service
    /// record still uses it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
