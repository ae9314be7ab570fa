// src/db/shipment_repo.rs

use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

// Read-only view over tables maintained by the shipment subsystem.
#[derive(Clone, Default)]
pub struct ShipmentRepository;

impl ShipmentRepository {
    pub fn new() -> Self {
        Self
    }

    /// Whether the shipment exists and is owned by `owner_id`.
    pub async fn belongs_to<'e, E>(&self, executor: E, owner_id: i64, shipment_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shipments WHERE id = $1 AND owner_id = $2)",
        )
        .bind(shipment_id)
        .bind(owner_id)
        .fetch_one(executor)
        .await?;
        Ok(owned)
    }

    /// Shipments connected to `shipment_id` by a link in either direction.
    pub async fn linked_shipments<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        shipment_id: i64,
    ) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CASE WHEN shipment_a_id = $2 THEN shipment_b_id ELSE shipment_a_id END
            FROM shipment_links
            WHERE owner_id = $1 AND (shipment_a_id = $2 OR shipment_b_id = $2)
            "#,
        )
        .bind(owner_id)
        .bind(shipment_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn customers_of<'e, E>(&self, executor: E, shipment_id: i64) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT customer_party_id FROM shipment_customers WHERE shipment_id = $1",
        )
        .bind(shipment_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }
}
