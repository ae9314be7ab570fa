// src/services/ledger_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LedgerRepository,
    models::ledger::{BalanceAudit, BalanceView, Direction, InventoryTransaction, LedgerTags},
};

#[derive(Clone)]
pub struct LedgerService {
    repo: LedgerRepository,
}

impl LedgerService {
    pub fn new(repo: LedgerRepository) -> Self {
        Self { repo }
    }

    /// Appends one ledger entry and folds it into the running balance.
    ///
    /// Takes the caller's connection on purpose: both writes belong to the
    /// caller's transaction (pledge registration or allocation) and must never
    /// commit on their own.
    pub async fn record(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
        good_id: Uuid,
        direction: Direction,
        quantity: Decimal,
        tags: LedgerTags<'_>,
    ) -> Result<InventoryTransaction, AppError> {
        if quantity.is_sign_negative() {
            return Err(AppError::InvalidInput("Ledger quantity must not be negative.".into()));
        }

        let entry = self
            .repo
            .insert_transaction(&mut *conn, owner_id, good_id, direction, quantity, &tags)
            .await?;

        let balance = self
            .repo
            .apply_delta(&mut *conn, owner_id, good_id, direction.signed(quantity))
            .await?;

        tracing::debug!(
            owner_id,
            %good_id,
            ?direction,
            %quantity,
            balance = %balance.quantity,
            "ledger entry recorded"
        );
        Ok(entry)
    }

    pub(crate) async fn has_in_entry(&self, conn: &mut PgConnection, pledge_id: Uuid) -> Result<bool, AppError> {
        self.repo.has_in_entry(conn, pledge_id).await
    }

    /// Repair path: rebuilds the stored balance from the ledger and reports
    /// what was there before. Not used when writing.
    pub async fn recompute_balance<'e, A>(
        &self,
        conn: A,
        owner_id: i64,
        good_id: Uuid,
    ) -> Result<BalanceAudit, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        // Lock first: a concurrent `record` must land either wholly before the
        // ledger sum below or wholly after the overwrite.
        let stored = self.repo.lock_balance(&mut *tx, owner_id, good_id).await?;
        let computed = self.repo.computed_balance(&mut *tx, owner_id, good_id).await?;
        self.repo.overwrite_balance(&mut *tx, owner_id, good_id, computed).await?;

        tx.commit().await?;

        let audit = BalanceAudit::new(good_id, stored, computed);
        if audit.is_consistent() {
            tracing::info!(owner_id, %good_id, %computed, "balance recomputed, no drift");
        } else {
            tracing::warn!(owner_id, %good_id, %stored, %computed, drift = %audit.drift, "balance drift repaired");
        }
        Ok(audit)
    }

    /// Read-only drift report across every good of the owner.
    pub async fn audit_balances(&self, owner_id: i64) -> Result<Vec<BalanceAudit>, AppError> {
        let audits = self.repo.audit(owner_id).await?;
        let drifted = audits.iter().filter(|a| !a.is_consistent()).count();
        if drifted > 0 {
            tracing::warn!(owner_id, drifted, "balances out of sync with ledger");
        }
        Ok(audits)
    }

    /// Current balance; zero when nothing was ever recorded.
    pub async fn get_balance(&self, owner_id: i64, good_id: Uuid) -> Result<Decimal, AppError> {
        Ok(self
            .repo
            .get_balance(owner_id, good_id)
            .await?
            .map(|b| b.quantity)
            .unwrap_or(Decimal::ZERO))
    }

    pub async fn list_balances(&self, owner_id: i64) -> Result<Vec<BalanceView>, AppError> {
        self.repo.list_balances(owner_id).await
    }
}
