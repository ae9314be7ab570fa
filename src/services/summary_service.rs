// src/services/summary_service.rs

use crate::{
    common::{db_utils::clamp_limit, error::AppError},
    db::SummaryRepository,
    models::{
        ledger::BalanceView,
        summary::{AccessScope, GoodsSummaryRow, HistoryRow},
    },
    services::ledger_service::LedgerService,
};

// Pure reads: nothing in here writes.
#[derive(Clone)]
pub struct SummaryService {
    repo: SummaryRepository,
    ledger: LedgerService,
}

impl SummaryService {
    pub fn new(repo: SummaryRepository, ledger: LedgerService) -> Self {
        Self { repo, ledger }
    }

    pub async fn customer_goods_summary(
        &self,
        owner_id: i64,
        customer_party_id: i64,
        scope: AccessScope,
    ) -> Result<Vec<GoodsSummaryRow>, AppError> {
        self.repo.customer_goods(owner_id, customer_party_id, scope).await
    }

    pub async fn shipment_goods_summary(
        &self,
        owner_id: i64,
        shipment_id: i64,
        scope: AccessScope,
    ) -> Result<Vec<GoodsSummaryRow>, AppError> {
        self.repo.shipment_goods(owner_id, shipment_id, scope).await
    }

    pub async fn owner_balances(&self, owner_id: i64) -> Result<Vec<BalanceView>, AppError> {
        self.ledger.list_balances(owner_id).await
    }

    pub async fn shipment_history(
        &self,
        owner_id: i64,
        shipment_id: i64,
        scope: AccessScope,
        limit: Option<i64>,
    ) -> Result<Vec<HistoryRow>, AppError> {
        self.repo
            .shipment_history(owner_id, shipment_id, scope, clamp_limit(limit))
            .await
    }

    pub async fn customer_history(
        &self,
        owner_id: i64,
        customer_party_id: i64,
        scope: AccessScope,
        limit: Option<i64>,
    ) -> Result<Vec<HistoryRow>, AppError> {
        self.repo
            .customer_history(owner_id, customer_party_id, scope, clamp_limit(limit))
            .await
    }
}
