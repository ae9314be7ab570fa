// src/models/pledges.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Customer scope of a pledge ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerScope {
    AllCustomers,
    Customer(i64),
}

impl CustomerScope {
    /// Builds the scope from the two request fields. A pledge with neither
    /// flag nor party has no scope and is rejected by the caller.
    pub fn from_parts(applies_to_all: bool, customer_party_id: Option<i64>) -> Option<Self> {
        match (applies_to_all, customer_party_id) {
            (true, _) => Some(CustomerScope::AllCustomers),
            (false, Some(party)) => Some(CustomerScope::Customer(party)),
            (false, None) => None,
        }
    }

    /// Column values: (applies_to_all_customers, customer_party_id).
    pub fn columns(self) -> (bool, Option<i64>) {
        match self {
            CustomerScope::AllCustomers => (true, None),
            CustomerScope::Customer(party) => (false, Some(party)),
        }
    }
}

// --- Pledge row (shipment_goods) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentGood {
    pub id: Uuid,
    #[schema(example = 100)]
    pub shipment_id: i64,
    #[schema(ignore)]
    pub owner_id: i64,
    pub good_id: Uuid,
    pub customer_party_id: Option<i64>,
    pub applies_to_all_customers: bool,
    #[schema(example = "50")]
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
}

impl ShipmentGood {
    pub fn scope(&self) -> CustomerScope {
        if self.applies_to_all_customers {
            CustomerScope::AllCustomers
        } else {
            // The table CHECK guarantees a party when the flag is off.
            CustomerScope::Customer(self.customer_party_id.unwrap_or_default())
        }
    }
}

// --- Pledge listing row ---
// allocated = SUM(taken), remaining = quantity - allocated, floored at 0.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PledgeView {
    pub id: Uuid,
    pub shipment_id: i64,
    pub good_id: Uuid,
    pub good_name: String,
    pub origin: String,
    pub unit_type: String,
    pub customer_party_id: Option<i64>,
    pub applies_to_all_customers: bool,
    pub quantity: Decimal,
    pub allocated_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_from_parts() {
        assert_eq!(CustomerScope::from_parts(true, Some(7)), Some(CustomerScope::AllCustomers));
        assert_eq!(CustomerScope::from_parts(false, Some(7)), Some(CustomerScope::Customer(7)));
        assert_eq!(CustomerScope::from_parts(false, None), None);
    }

    #[test]
    fn scope_columns_round_trip_through_row() {
        let (all, party) = CustomerScope::Customer(9).columns();
        assert!(!all);
        assert_eq!(party, Some(9));
        assert_eq!(CustomerScope::AllCustomers.columns(), (true, None));
    }
}
