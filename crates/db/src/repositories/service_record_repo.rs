//! Repository for `service_records` and their product lines.

use std::collections::HashMap;

use salon_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_record::{CreateServiceRecord, ProductUsage, ServiceRecord};

const RECORD_SELECT: &str = "SELECT r.id, r.client_id, r.description, r.performed_on, \
        r.created_at, r.updated_at, \
        c.first_name AS client_first_name, c.last_name AS client_last_name \
     FROM service_records r \
     JOIN clients c ON c.id = r.client_id";

/// Provides create/list/delete for service records.
pub struct ServiceRecordRepo;

impl ServiceRecordRepo {
    /// Insert a record and its product lines in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateServiceRecord,
    ) -> Result<ServiceRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO service_records (client_id, description, performed_on) \
             VALUES ($1, $2, COALESCE($3, CURRENT_DATE)) \
             RETURNING id",
        )
        .bind(input.client_id)
        .bind(input.description.trim())
        .bind(input.performed_on)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.products {
            sqlx::query(
                "INSERT INTO service_record_products (service_record_id, product_id, quantity) \
                 VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a record with its product lines.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ServiceRecord>, sqlx::Error> {
        let query = format!("{RECORD_SELECT} WHERE r.id = $1");
        let found = sqlx::query_as::<_, ServiceRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match found {
            Some(record) => Ok(Self::with_products(pool, vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List records newest first, optionally for one client.
    pub async fn list(
        pool: &PgPool,
        client_id: Option<DbId>,
    ) -> Result<Vec<ServiceRecord>, sqlx::Error> {
        let query = format!(
            "{RECORD_SELECT} \
             WHERE ($1::bigint IS NULL OR r.client_id = $1) \
             ORDER BY r.performed_on DESC, r.id DESC"
        );
        let records = sqlx::query_as::<_, ServiceRecord>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await?;
        Self::with_products(pool, records).await
    }

    /// Delete a record. Product lines cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_products(
        pool: &PgPool,
        records: Vec<ServiceRecord>,
    ) -> Result<Vec<ServiceRecord>, sqlx::Error> {
        if records.is_empty() {
            return Ok(records);
        }

        let ids: Vec<DbId> = records.iter().map(|r| r.id).collect();
        let lines = sqlx::query_as::<_, ProductUsage>(
            "SELECT u.service_record_id, u.product_id, p.name AS product_name, \
                    p.price_cents, u.quantity \
             FROM service_record_products u \
             JOIN products p ON p.id = u.product_id \
             WHERE u.service_record_id = ANY($1) \
             ORDER BY u.service_record_id, u.id",
        )
        .bind(&ids[..])
        .fetch_all(pool)
        .await?;

        let mut by_record: HashMap<DbId, Vec<ProductUsage>> = HashMap::new();
        for line in lines {
            by_record.entry(line.service_record_id).or_default().push(line);
        }

        Ok(records
            .into_iter()
            .map(|mut r| {
                r.products = by_record.remove(&r.id).unwrap_or_default();
                r
            })
            .collect())
    }
}
