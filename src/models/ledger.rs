// src/models/ledger.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inventory_direction", rename_all = "SCREAMING_SNAKE_CASE")] // DB: 'IN' / 'OUT'
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Delta applied to the running balance for a movement of `quantity`.
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            Direction::In => quantity,
            Direction::Out => -quantity,
        }
    }
}

/// Optional provenance attached to a ledger entry.
#[derive(Debug, Clone, Default)]
pub struct LedgerTags<'a> {
    pub shipment_id: Option<i64>,
    pub shipment_good_id: Option<Uuid>,
    pub step_id: Option<i64>,
    pub note: Option<&'a str>,
}

// --- Ledger entry (append-only) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTransaction {
    pub id: Uuid,
    #[schema(ignore)]
    pub owner_id: i64,
    pub good_id: Uuid,
    pub direction: Direction,
    pub quantity: Decimal,
    pub shipment_id: Option<i64>,
    pub shipment_good_id: Option<Uuid>,
    pub step_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Materialized balance ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBalance {
    #[schema(ignore)]
    pub owner_id: i64,
    pub good_id: Uuid,
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

// Balance joined with catalog data (per-owner summary).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub good_id: Uuid,
    pub good_name: String,
    pub origin: String,
    pub unit_type: String,
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Stored balance vs. the value folded from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAudit {
    pub good_id: Uuid,
    pub stored: Decimal,
    pub computed: Decimal,
    pub drift: Decimal,
}

impl BalanceAudit {
    pub fn new(good_id: Uuid, stored: Decimal, computed: Decimal) -> Self {
        Self { good_id, stored, computed, drift: stored - computed }
    }

    pub fn is_consistent(&self) -> bool {
        self.drift.is_zero()
    }
}

/// Folds ledger movements into a balance: sum of IN minus sum of OUT.
pub fn fold_balance<I>(movements: I) -> Decimal
where
    I: IntoIterator<Item = (Direction, Decimal)>,
{
    movements
        .into_iter()
        .fold(Decimal::ZERO, |acc, (direction, quantity)| acc + direction.signed(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_delta() {
        assert_eq!(Direction::In.signed(Decimal::from(50)), Decimal::from(50));
        assert_eq!(Direction::Out.signed(Decimal::from(20)), Decimal::from(-20));
    }

    #[test]
    fn fold_matches_in_minus_out() {
        let moves = vec![
            (Direction::In, Decimal::from(50)),
            (Direction::Out, Decimal::from(20)),
            (Direction::Out, Decimal::from(30)),
            (Direction::In, Decimal::new(25, 1)),
        ];
        assert_eq!(fold_balance(moves), Decimal::new(25, 1));
        assert_eq!(fold_balance(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn audit_reports_drift() {
        let id = Uuid::new_v4();
        let audit = BalanceAudit::new(id, Decimal::from(30), Decimal::from(30));
        assert!(audit.is_consistent());

        let audit = BalanceAudit::new(id, Decimal::from(35), Decimal::from(30));
        assert_eq!(audit.drift, Decimal::from(5));
        assert!(!audit.is_consistent());
    }
}
