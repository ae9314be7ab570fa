// src/models/allocations.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Allocation record (shipment_goods_allocations) ---
// At most one row per (shipment_good_id, step_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentGoodsAllocation {
    pub id: Uuid,
    #[schema(ignore)]
    pub owner_id: i64,
    /// Kept after the pledge itself is removed.
    pub shipment_good_id: Uuid,
    #[schema(example = 10)]
    pub step_id: i64,
    #[schema(example = "20")]
    pub taken_quantity: Decimal,
    /// What was left on the pledge after this application.
    #[schema(example = "30")]
    pub inventory_quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
}

/// One line of a step completion: "take this much from that pledge".
/// Any quantity is accepted; the engine floors it and clamps it to `0..=available`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub pledge_id: Uuid,
    #[schema(example = "20")]
    pub requested_quantity: Decimal,
}

/// Why a request produced no allocation. None of these fail the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// An allocation for (pledge, step) already exists.
    Duplicate,
    NotFound,
    /// Neither on this shipment nor on a linked one sharing a customer.
    Unreachable,
    OwnerMismatch,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum AllocationOutcome {
    #[serde(rename = "APPLIED", rename_all = "camelCase")]
    Applied {
        pledge_id: Uuid,
        taken_quantity: Decimal,
        remaining_quantity: Decimal,
    },
    #[serde(rename = "SKIPPED", rename_all = "camelCase")]
    Skipped { pledge_id: Uuid, reason: SkipReason },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReport {
    pub shipment_id: i64,
    pub step_id: i64,
    pub outcomes: Vec<AllocationOutcome>,
}

impl AllocationReport {
    pub fn new(shipment_id: i64, step_id: i64) -> Self {
        Self { shipment_id, step_id, outcomes: Vec::new() }
    }

    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AllocationOutcome::Applied { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

/// Result of the arithmetic for one request against one pledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPlan {
    pub available: Decimal,
    pub taken: Decimal,
    pub remaining: Decimal,
}

impl AllocationPlan {
    /// available = max(0, pledged - already_taken)
    /// taken     = min(max(0, floor(requested)), available)
    /// remaining = available - taken
    pub fn compute(
        pledged: Decimal,
        already_taken: Decimal,
        requested: Decimal,
    ) -> Result<Self, SkipReason> {
        let available = (pledged - already_taken).max(Decimal::ZERO);
        if available <= Decimal::ZERO {
            return Err(SkipReason::Exhausted);
        }

        let taken = requested.floor().max(Decimal::ZERO).min(available);
        Ok(Self {
            available,
            taken,
            remaining: available - taken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ledger::{fold_balance, Direction};
    use proptest::prelude::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn partial_take_leaves_remainder() {
        let plan = AllocationPlan::compute(d(50), d(0), d(20)).unwrap();
        assert_eq!(plan.taken, d(20));
        assert_eq!(plan.remaining, d(30));
    }

    #[test]
    fn oversized_request_is_clamped() {
        let plan = AllocationPlan::compute(d(50), d(20), d(999)).unwrap();
        assert_eq!(plan.available, d(30));
        assert_eq!(plan.taken, d(30));
        assert_eq!(plan.remaining, d(0));
    }

    #[test]
    fn fractional_request_is_floored() {
        let plan = AllocationPlan::compute(d(10), d(0), Decimal::new(39, 1)).unwrap();
        assert_eq!(plan.taken, d(3));
        assert_eq!(plan.remaining, d(7));
    }

    #[test]
    fn negative_request_takes_nothing() {
        let plan = AllocationPlan::compute(d(10), d(0), d(-4)).unwrap();
        assert_eq!(plan.taken, d(0));
        assert_eq!(plan.remaining, d(10));
    }

    #[test]
    fn exhausted_pledge_is_skipped() {
        assert_eq!(AllocationPlan::compute(d(50), d(50), d(1)), Err(SkipReason::Exhausted));
        // Over-taken history (should never happen) still floors at zero.
        assert_eq!(AllocationPlan::compute(d(50), d(60), d(1)), Err(SkipReason::Exhausted));
        assert_eq!(AllocationPlan::compute(d(0), d(0), d(1)), Err(SkipReason::Exhausted));
    }

    #[test]
    fn report_counts() {
        let mut report = AllocationReport::new(100, 10);
        report.outcomes.push(AllocationOutcome::Applied {
            pledge_id: Uuid::new_v4(),
            taken_quantity: d(1),
            remaining_quantity: d(2),
        });
        report.outcomes.push(AllocationOutcome::Skipped {
            pledge_id: Uuid::new_v4(),
            reason: SkipReason::Duplicate,
        });
        assert_eq!(report.applied(), 1);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let id = Uuid::nil();
        let json = serde_json::to_value(AllocationOutcome::Skipped {
            pledge_id: id,
            reason: SkipReason::OwnerMismatch,
        })
        .unwrap();
        assert_eq!(json["status"], "SKIPPED");
        assert_eq!(json["reason"], "OWNER_MISMATCH");
        assert_eq!(json["pledgeId"], id.to_string());
    }

    proptest! {
        // Whatever sequence of requests hits a pledge, the total taken never
        // exceeds what was pledged.
        #[test]
        fn never_over_allocates(pledged in 0i64..10_000, requests in prop::collection::vec(-50i64..5_000, 0..20)) {
            let pledged = d(pledged);
            let mut taken_total = Decimal::ZERO;
            for req in requests {
                if let Ok(plan) = AllocationPlan::compute(pledged, taken_total, d(req)) {
                    prop_assert!(plan.taken >= Decimal::ZERO);
                    prop_assert_eq!(plan.taken + plan.remaining, plan.available);
                    taken_total += plan.taken;
                }
                prop_assert!(taken_total <= pledged);
            }
        }

        // The ledger written by a pledge and its steps folds back to the
        // pledge's remaining quantity.
        #[test]
        fn ledger_folds_to_remaining(pledged in 0i64..10_000, requests in prop::collection::vec(0i64..5_000, 0..20)) {
            let pledged = d(pledged);
            let mut moves = Vec::new();
            if pledged > Decimal::ZERO {
                moves.push((Direction::In, pledged));
            }
            let mut taken_total = Decimal::ZERO;
            for req in requests {
                if let Ok(plan) = AllocationPlan::compute(pledged, taken_total, d(req)) {
                    if plan.taken > Decimal::ZERO {
                        moves.push((Direction::Out, plan.taken));
                    }
                    taken_total += plan.taken;
                }
            }
            let balance = fold_balance(moves);
            prop_assert_eq!(balance, pledged - taken_total);
            prop_assert!(balance >= Decimal::ZERO);
        }
    }
}
