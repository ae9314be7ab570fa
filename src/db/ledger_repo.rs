// src/db/ledger_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ledger::{BalanceAudit, BalanceView, Direction, InventoryBalance, InventoryTransaction, LedgerTags},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEDGER (append-only)
    // =========================================================================

    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        good_id: Uuid,
        direction: Direction,
        quantity: Decimal,
        tags: &LedgerTags<'_>,
    ) -> Result<InventoryTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            INSERT INTO inventory_transactions (
                owner_id, good_id, direction, quantity,
                shipment_id, shipment_good_id, step_id, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(good_id)
        .bind(direction)
        .bind(quantity)
        .bind(tags.shipment_id)
        .bind(tags.shipment_good_id)
        .bind(tags.step_id)
        .bind(tags.note)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    /// Whether the pledge's "goods received" entry has been written.
    pub async fn has_in_entry<'e, E>(&self, executor: E, pledge_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM inventory_transactions
                WHERE shipment_good_id = $1 AND direction = 'IN'
            )
            "#,
        )
        .bind(pledge_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    // =========================================================================
    //  BALANCES
    // =========================================================================

    /// Adds `delta` to the running balance. Creates the row at `delta` when absent.
    /// The increment happens in SQL so concurrent writers never lose updates.
    pub async fn apply_delta<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        good_id: Uuid,
        delta: Decimal,
    ) -> Result<InventoryBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, InventoryBalance>(
            r#"
            INSERT INTO inventory_balances (owner_id, good_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner_id, good_id)
            DO UPDATE SET
                quantity = inventory_balances.quantity + EXCLUDED.quantity,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(good_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;
        Ok(balance)
    }

    /// Sum of IN minus sum of OUT straight from the ledger.
    pub async fn computed_balance<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        good_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(CASE WHEN direction = 'IN' THEN quantity ELSE -quantity END), 0)
            FROM inventory_transactions
            WHERE owner_id = $1 AND good_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(good_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    /// Locks the balance row until the transaction ends and returns its value.
    /// A missing row is created at zero first, so even a first-ever write
    /// from another transaction has to wait for the lock.
    pub async fn lock_balance(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
        good_id: Uuid,
    ) -> Result<Decimal, AppError> {
        sqlx::query(
            r#"
            INSERT INTO inventory_balances (owner_id, good_id, quantity)
            VALUES ($1, $2, 0)
            ON CONFLICT (owner_id, good_id) DO NOTHING
            "#,
        )
        .bind(owner_id)
        .bind(good_id)
        .execute(&mut *conn)
        .await?;

        let stored: Decimal = sqlx::query_scalar(
            "SELECT quantity FROM inventory_balances WHERE owner_id = $1 AND good_id = $2 FOR UPDATE",
        )
        .bind(owner_id)
        .bind(good_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(stored)
    }

    pub async fn overwrite_balance<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        good_id: Uuid,
        quantity: Decimal,
    ) -> Result<InventoryBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, InventoryBalance>(
            r#"
            INSERT INTO inventory_balances (owner_id, good_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner_id, good_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(good_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(balance)
    }

    // ---
    // Reads (pool)
    // ---

    pub async fn get_balance(
        &self,
        owner_id: i64,
        good_id: Uuid,
    ) -> Result<Option<InventoryBalance>, AppError> {
        let balance = sqlx::query_as::<_, InventoryBalance>(
            "SELECT * FROM inventory_balances WHERE owner_id = $1 AND good_id = $2",
        )
        .bind(owner_id)
        .bind(good_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(balance)
    }

    pub async fn list_balances(&self, owner_id: i64) -> Result<Vec<BalanceView>, AppError> {
        let rows = sqlx::query_as::<_, BalanceView>(
            r#"
            SELECT
                b.good_id, g.name AS good_name, g.origin, g.unit_type,
                b.quantity, b.updated_at
            FROM inventory_balances b
            JOIN goods g ON g.id = b.good_id
            WHERE b.owner_id = $1
            ORDER BY g.name ASC, g.origin ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Stored vs. ledger-derived balance for every good the owner has touched.
    pub async fn audit(&self, owner_id: i64) -> Result<Vec<BalanceAudit>, AppError> {
        let rows = sqlx::query_as::<_, BalanceAudit>(
            r#"
            WITH ledger AS (
                SELECT good_id,
                       SUM(CASE WHEN direction = 'IN' THEN quantity ELSE -quantity END) AS computed
                FROM inventory_transactions
                WHERE owner_id = $1
                GROUP BY good_id
            ),
            stored AS (
                SELECT good_id, quantity AS stored
                FROM inventory_balances
                WHERE owner_id = $1
            )
            SELECT
                COALESCE(s.good_id, l.good_id) AS good_id,
                COALESCE(s.stored, 0) AS stored,
                COALESCE(l.computed, 0) AS computed,
                COALESCE(s.stored, 0) - COALESCE(l.computed, 0) AS drift
            FROM stored s
            FULL OUTER JOIN ledger l ON l.good_id = s.good_id
            ORDER BY 1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
