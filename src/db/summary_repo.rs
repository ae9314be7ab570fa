// src/db/summary_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::summary::{AccessScope, GoodsSummaryRow, HistoryRow},
};

// Read-only aggregations. Every query filters by owner and by the caller's
// shipment visibility ($3 = can access all, $4 = user id for explicit grants).
#[derive(Clone)]
pub struct SummaryRepository {
    pool: PgPool,
}

impl SummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Goods pledged for one customer across every shipment it appears on
    pub async fn customer_goods(
        &self,
        owner_id: i64,
        customer_party_id: i64,
        scope: AccessScope,
    ) -> Result<Vec<GoodsSummaryRow>, AppError> {
        let rows = sqlx::query_as::<_, GoodsSummaryRow>(
            r#"
            SELECT
                g.id AS good_id, g.name AS good_name, g.origin, g.unit_type,
                SUM(sg.quantity) AS pledged_quantity,
                SUM(GREATEST(sg.quantity - COALESCE(a.taken, 0), 0)) AS remaining_quantity
            FROM shipment_goods sg
            JOIN goods g ON g.id = sg.good_id
            JOIN shipment_customers sc
              ON sc.shipment_id = sg.shipment_id AND sc.customer_party_id = $2
            LEFT JOIN (
                SELECT shipment_good_id, SUM(taken_quantity) AS taken
                FROM shipment_goods_allocations
                GROUP BY shipment_good_id
            ) a ON a.shipment_good_id = sg.id
            WHERE sg.owner_id = $1
              AND (sg.applies_to_all_customers OR sg.customer_party_id = $2)
              AND ($3 OR EXISTS (
                    SELECT 1 FROM shipment_access sa
                    WHERE sa.user_id = $4 AND sa.shipment_id = sg.shipment_id
              ))
            GROUP BY g.id, g.name, g.origin, g.unit_type
            ORDER BY g.name ASC, g.origin ASC
            "#,
        )
        .bind(owner_id)
        .bind(customer_party_id)
        .bind(scope.can_access_all_shipments)
        .bind(scope.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 2. Goods pledged on one shipment
    pub async fn shipment_goods(
        &self,
        owner_id: i64,
        shipment_id: i64,
        scope: AccessScope,
    ) -> Result<Vec<GoodsSummaryRow>, AppError> {
        let rows = sqlx::query_as::<_, GoodsSummaryRow>(
            r#"
            SELECT
                g.id AS good_id, g.name AS good_name, g.origin, g.unit_type,
                SUM(sg.quantity) AS pledged_quantity,
                SUM(GREATEST(sg.quantity - COALESCE(a.taken, 0), 0)) AS remaining_quantity
            FROM shipment_goods sg
            JOIN goods g ON g.id = sg.good_id
            LEFT JOIN (
                SELECT shipment_good_id, SUM(taken_quantity) AS taken
                FROM shipment_goods_allocations
                GROUP BY shipment_good_id
            ) a ON a.shipment_good_id = sg.id
            WHERE sg.owner_id = $1
              AND sg.shipment_id = $2
              AND ($3 OR EXISTS (
                    SELECT 1 FROM shipment_access sa
                    WHERE sa.user_id = $4 AND sa.shipment_id = sg.shipment_id
              ))
            GROUP BY g.id, g.name, g.origin, g.unit_type
            ORDER BY g.name ASC, g.origin ASC
            "#,
        )
        .bind(owner_id)
        .bind(shipment_id)
        .bind(scope.can_access_all_shipments)
        .bind(scope.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 3. Ledger rows tagged with one shipment, newest first
    pub async fn shipment_history(
        &self,
        owner_id: i64,
        shipment_id: i64,
        scope: AccessScope,
        limit: i64,
    ) -> Result<Vec<HistoryRow>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT
                t.id, t.good_id, g.name AS good_name, t.direction, t.quantity,
                t.shipment_id, s.code AS shipment_code, t.shipment_good_id, t.step_id,
                sg.customer_party_id, p.name AS customer_name,
                t.note, t.created_at
            FROM inventory_transactions t
            JOIN goods g ON g.id = t.good_id
            LEFT JOIN shipments s ON s.id = t.shipment_id
            LEFT JOIN shipment_goods sg ON sg.id = t.shipment_good_id
            LEFT JOIN parties p ON p.id = sg.customer_party_id
            WHERE t.owner_id = $1
              AND t.shipment_id = $2
              AND ($3 OR EXISTS (
                    SELECT 1 FROM shipment_access sa
                    WHERE sa.user_id = $4 AND sa.shipment_id = t.shipment_id
              ))
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $5
            "#,
        )
        .bind(owner_id)
        .bind(shipment_id)
        .bind(scope.can_access_all_shipments)
        .bind(scope.user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 4. Ledger rows that concern one customer, newest first.
    // A row counts when its pledge targets the customer, or when it targets all
    // customers (or the pledge is gone) and the shipment serves the customer.
    pub async fn customer_history(
        &self,
        owner_id: i64,
        customer_party_id: i64,
        scope: AccessScope,
        limit: i64,
    ) -> Result<Vec<HistoryRow>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT
                t.id, t.good_id, g.name AS good_name, t.direction, t.quantity,
                t.shipment_id, s.code AS shipment_code, t.shipment_good_id, t.step_id,
                $2::BIGINT AS customer_party_id,
                (SELECT name FROM parties WHERE id = $2) AS customer_name,
                t.note, t.created_at
            FROM inventory_transactions t
            JOIN goods g ON g.id = t.good_id
            LEFT JOIN shipments s ON s.id = t.shipment_id
            LEFT JOIN shipment_goods sg ON sg.id = t.shipment_good_id
            WHERE t.owner_id = $1
              AND (
                    sg.customer_party_id = $2
                 OR ((sg.id IS NULL OR sg.applies_to_all_customers) AND EXISTS (
                        SELECT 1 FROM shipment_customers sc
                        WHERE sc.shipment_id = t.shipment_id AND sc.customer_party_id = $2
                    ))
              )
              AND ($3 OR EXISTS (
                    SELECT 1 FROM shipment_access sa
                    WHERE sa.user_id = $4 AND sa.shipment_id = t.shipment_id
              ))
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $5
            "#,
        )
        .bind(owner_id)
        .bind(customer_party_id)
        .bind(scope.can_access_all_shipments)
        .bind(scope.user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
