// src/services/allocation_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AllocationRepository, PledgeRepository, ShipmentRepository},
    models::{
        allocations::{
            AllocationOutcome, AllocationPlan, AllocationReport, AllocationRequest,
            ShipmentGoodsAllocation, SkipReason,
        },
        ledger::{Direction, LedgerTags},
    },
    services::{
        ledger_service::LedgerService,
        pledge_service::GOODS_RECEIVED_NOTE,
        resolver::{CrossShipmentResolver, EligiblePool},
    },
};

pub const STEP_ALLOCATION_NOTE: &str = "allocated to workflow step";

#[derive(Clone)]
pub struct AllocationService {
    allocation_repo: AllocationRepository,
    pledge_repo: PledgeRepository,
    shipment_repo: ShipmentRepository,
    resolver: CrossShipmentResolver,
    ledger: LedgerService,
}

impl AllocationService {
    pub fn new(
        allocation_repo: AllocationRepository,
        pledge_repo: PledgeRepository,
        shipment_repo: ShipmentRepository,
        resolver: CrossShipmentResolver,
        ledger: LedgerService,
    ) -> Self {
        Self { allocation_repo, pledge_repo, shipment_repo, resolver, ledger }
    }

    // =========================================================================
    //  APPLY
    // =========================================================================

    /// Applies a step's allocation requests in one transaction, in the order
    /// given. Requests that have nothing to do are reported as skipped; only a
    /// storage failure returns an error, and then nothing of the batch is kept.
    pub async fn apply_allocations<'e, A>(
        &self,
        conn: A,
        shipment_id: i64,
        step_id: i64,
        owner_id: i64,
        requests: &[AllocationRequest],
        created_by: Option<i64>,
    ) -> Result<AllocationReport, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut report = AllocationReport::new(shipment_id, step_id);
        if requests.is_empty() {
            return Ok(report);
        }

        let mut tx = conn.begin().await?;

        // A shipment of another owner reaches nothing; nothing is written.
        if !self.shipment_repo.belongs_to(&mut *tx, owner_id, shipment_id).await? {
            tracing::warn!(shipment_id, step_id, owner_id, "allocation on a shipment the owner does not hold");
            report.outcomes = requests
                .iter()
                .map(|r| AllocationOutcome::Skipped { pledge_id: r.pledge_id, reason: SkipReason::Unreachable })
                .collect();
            return Ok(report);
        }

        // Fresh on every call; never reused across batches.
        let pool = self.resolver.eligible_pool(&mut *tx, owner_id, shipment_id).await?;

        for request in requests {
            let outcome = self
                .apply_one(&mut *tx, &pool, shipment_id, step_id, owner_id, request, created_by)
                .await?;

            match &outcome {
                AllocationOutcome::Applied { pledge_id, taken_quantity, remaining_quantity } => {
                    tracing::debug!(
                        shipment_id,
                        step_id,
                        %pledge_id,
                        taken = %taken_quantity,
                        remaining = %remaining_quantity,
                        "allocation applied"
                    );
                }
                AllocationOutcome::Skipped { pledge_id, reason } => {
                    tracing::debug!(shipment_id, step_id, %pledge_id, ?reason, "allocation skipped");
                }
            }
            report.outcomes.push(outcome);
        }

        tx.commit().await?;

        tracing::info!(
            shipment_id,
            step_id,
            owner_id,
            applied = report.applied(),
            skipped = report.skipped(),
            "step allocations committed"
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    async fn apply_one(
        &self,
        conn: &mut PgConnection,
        pool: &EligiblePool,
        shipment_id: i64,
        step_id: i64,
        owner_id: i64,
        request: &AllocationRequest,
        created_by: Option<i64>,
    ) -> Result<AllocationOutcome, AppError> {
        let pledge_id = request.pledge_id;
        let skip = |reason: SkipReason| -> Result<AllocationOutcome, AppError> {
            Ok(AllocationOutcome::Skipped { pledge_id, reason })
        };

        // 1. Idempotency: this step already consumed from this pledge.
        if self.allocation_repo.exists(&mut *conn, pledge_id, step_id).await? {
            return skip(SkipReason::Duplicate);
        }

        // 2. Reachability: own shipment, or linked with a shared customer.
        let Some((candidate, _)) = pool.get(&pledge_id) else {
            let known = self.pledge_repo.find_by_id(&mut *conn, pledge_id).await?.is_some();
            return skip(if known { SkipReason::Unreachable } else { SkipReason::NotFound });
        };

        // 3. Owner check.
        if candidate.owner_id != owner_id {
            return skip(SkipReason::OwnerMismatch);
        }

        // 4. Lock the pledge, then read what is left of it.
        let Some(pledge) = self.pledge_repo.lock_by_id(&mut *conn, pledge_id).await? else {
            // Deleted after the pool was resolved.
            return skip(SkipReason::NotFound);
        };
        let already_taken = self.allocation_repo.total_taken(&mut *conn, pledge_id).await?;

        // 5. Clamp the request to availability.
        let plan = match AllocationPlan::compute(pledge.quantity, already_taken, request.requested_quantity) {
            Ok(plan) => plan,
            Err(reason) => return skip(reason),
        };

        // 6. Record the allocation; the unique (pledge, step) constraint is the fence.
        let inserted = self
            .allocation_repo
            .insert_if_absent(&mut *conn, pledge.owner_id, pledge_id, step_id, plan.taken, plan.remaining, created_by)
            .await?;
        if inserted.is_none() {
            return skip(SkipReason::Duplicate);
        }

        // 7. Normally written at registration; covers pledges that predate it.
        if pledge.quantity > Decimal::ZERO && !self.ledger.has_in_entry(&mut *conn, pledge_id).await? {
            tracing::warn!(%pledge_id, "pledge had no receipt entry, writing it now");
            self.ledger
                .record(
                    &mut *conn,
                    pledge.owner_id,
                    pledge.good_id,
                    Direction::In,
                    pledge.quantity,
                    LedgerTags {
                        shipment_id: Some(pledge.shipment_id),
                        shipment_good_id: Some(pledge_id),
                        step_id: None,
                        note: Some(GOODS_RECEIVED_NOTE),
                    },
                )
                .await?;
        }

        // 8. Consume.
        if plan.taken > Decimal::ZERO {
            self.ledger
                .record(
                    &mut *conn,
                    pledge.owner_id,
                    pledge.good_id,
                    Direction::Out,
                    plan.taken,
                    LedgerTags {
                        shipment_id: Some(shipment_id),
                        shipment_good_id: Some(pledge_id),
                        step_id: Some(step_id),
                        note: Some(STEP_ALLOCATION_NOTE),
                    },
                )
                .await?;
        }

        Ok(AllocationOutcome::Applied {
            pledge_id,
            taken_quantity: plan.taken,
            remaining_quantity: plan.remaining,
        })
    }

    // =========================================================================
    //  READS
    // =========================================================================

    pub async fn list_step_allocations(
        &self,
        owner_id: i64,
        step_id: i64,
    ) -> Result<Vec<ShipmentGoodsAllocation>, AppError> {
        self.allocation_repo.list_for_step(owner_id, step_id).await
    }

    pub async fn list_pledge_allocations(
        &self,
        owner_id: i64,
        pledge_id: Uuid,
    ) -> Result<Vec<ShipmentGoodsAllocation>, AppError> {
        self.allocation_repo.list_for_pledge(owner_id, pledge_id).await
    }
}
