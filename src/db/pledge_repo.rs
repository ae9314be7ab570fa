// src/db/pledge_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pledges::{CustomerScope, PledgeView, ShipmentGood},
};

#[derive(Clone)]
pub struct PledgeRepository {
    pool: PgPool,
}

impl PledgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        shipment_id: i64,
        owner_id: i64,
        good_id: Uuid,
        scope: CustomerScope,
        quantity: Decimal,
        created_by: Option<i64>,
    ) -> Result<ShipmentGood, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (applies_to_all, customer_party_id) = scope.columns();

        let pledge = sqlx::query_as::<_, ShipmentGood>(
            r#"
            INSERT INTO shipment_goods (
                shipment_id, owner_id, good_id,
                customer_party_id, applies_to_all_customers, quantity, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(shipment_id)
        .bind(owner_id)
        .bind(good_id)
        .bind(customer_party_id)
        .bind(applies_to_all)
        .bind(quantity)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(pledge)
    }

    /// Hard delete. Returns the number of rows removed (0 or 1).
    pub async fn delete<'e, E>(&self, executor: E, owner_id: i64, pledge_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM shipment_goods WHERE id = $1 AND owner_id = $2")
            .bind(pledge_id)
            .bind(owner_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, pledge_id: Uuid) -> Result<Option<ShipmentGood>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pledge = sqlx::query_as::<_, ShipmentGood>("SELECT * FROM shipment_goods WHERE id = $1")
            .bind(pledge_id)
            .fetch_optional(executor)
            .await?;
        Ok(pledge)
    }

    /// Row-locks the pledge until the surrounding transaction ends, so two
    /// steps cannot both read the same `available` and over-allocate.
    pub async fn lock_by_id<'e, E>(&self, executor: E, pledge_id: Uuid) -> Result<Option<ShipmentGood>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pledge = sqlx::query_as::<_, ShipmentGood>(
            "SELECT * FROM shipment_goods WHERE id = $1 FOR UPDATE",
        )
        .bind(pledge_id)
        .fetch_optional(executor)
        .await?;
        Ok(pledge)
    }

    /// Every pledge sitting on any of the given shipments.
    pub async fn list_on_shipments<'e, E>(
        &self,
        executor: E,
        shipment_ids: &[i64],
    ) -> Result<Vec<ShipmentGood>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pledges = sqlx::query_as::<_, ShipmentGood>(
            "SELECT * FROM shipment_goods WHERE shipment_id = ANY($1) ORDER BY created_at, id",
        )
        .bind(shipment_ids)
        .fetch_all(executor)
        .await?;
        Ok(pledges)
    }

    pub async fn list_views(&self, owner_id: i64, shipment_id: i64) -> Result<Vec<PledgeView>, AppError> {
        let rows = sqlx::query_as::<_, PledgeView>(
            r#"
            SELECT
                sg.id, sg.shipment_id, sg.good_id,
                g.name AS good_name, g.origin, g.unit_type,
                sg.customer_party_id, sg.applies_to_all_customers, sg.quantity,
                COALESCE(a.taken, 0) AS allocated_quantity,
                GREATEST(sg.quantity - COALESCE(a.taken, 0), 0) AS remaining_quantity,
                sg.created_at
            FROM shipment_goods sg
            JOIN goods g ON g.id = sg.good_id
            LEFT JOIN (
                SELECT shipment_good_id, SUM(taken_quantity) AS taken
                FROM shipment_goods_allocations
                GROUP BY shipment_good_id
            ) a ON a.shipment_good_id = sg.id
            WHERE sg.owner_id = $1 AND sg.shipment_id = $2
            ORDER BY sg.created_at ASC, sg.id ASC
            "#,
        )
        .bind(owner_id)
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
