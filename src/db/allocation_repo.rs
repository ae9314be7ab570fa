// src/db/allocation_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::allocations::ShipmentGoodsAllocation};

#[derive(Clone)]
pub struct AllocationRepository {
    pool: PgPool,
}

impl AllocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists<'e, E>(&self, executor: E, pledge_id: Uuid, step_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM shipment_goods_allocations
                WHERE shipment_good_id = $1 AND step_id = $2
            )
            "#,
        )
        .bind(pledge_id)
        .bind(step_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn total_taken<'e, E>(&self, executor: E, pledge_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(taken_quantity), 0) FROM shipment_goods_allocations WHERE shipment_good_id = $1",
        )
        .bind(pledge_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    /// Inserts the allocation unless (pledge, step) is already fenced.
    /// None means a concurrent writer recorded it first.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_if_absent<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        pledge_id: Uuid,
        step_id: i64,
        taken: Decimal,
        remaining: Decimal,
        created_by: Option<i64>,
    ) -> Result<Option<ShipmentGoodsAllocation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ShipmentGoodsAllocation>(
            r#"
            INSERT INTO shipment_goods_allocations (
                owner_id, shipment_good_id, step_id, taken_quantity, inventory_quantity, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT shipment_goods_allocations_pledge_step_key DO NOTHING
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(pledge_id)
        .bind(step_id)
        .bind(taken)
        .bind(remaining)
        .bind(created_by)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // ---
    // Reads (pool)
    // ---

    pub async fn list_for_step(&self, owner_id: i64, step_id: i64) -> Result<Vec<ShipmentGoodsAllocation>, AppError> {
        let rows = sqlx::query_as::<_, ShipmentGoodsAllocation>(
            r#"
            SELECT a.*
            FROM shipment_goods_allocations a
            WHERE a.owner_id = $1 AND a.step_id = $2
            ORDER BY a.created_at ASC, a.id ASC
            "#,
        )
        .bind(owner_id)
        .bind(step_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_pledge(&self, owner_id: i64, pledge_id: Uuid) -> Result<Vec<ShipmentGoodsAllocation>, AppError> {
        let rows = sqlx::query_as::<_, ShipmentGoodsAllocation>(
            r#"
            SELECT a.*
            FROM shipment_goods_allocations a
            WHERE a.owner_id = $1 AND a.shipment_good_id = $2
            ORDER BY a.created_at ASC, a.id ASC
            "#,
        )
        .bind(owner_id)
        .bind(pledge_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
