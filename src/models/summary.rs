// src/models/summary.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ledger::Direction;

/// Which shipments a caller may see. Supplied by the caller, never derived here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessScope {
    pub user_id: i64,
    pub can_access_all_shipments: bool,
}

impl AccessScope {
    pub fn all(user_id: i64) -> Self {
        Self { user_id, can_access_all_shipments: true }
    }

    pub fn restricted(user_id: i64) -> Self {
        Self { user_id, can_access_all_shipments: false }
    }
}

// --- Goods totals per good (per-customer / per-shipment summaries) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoodsSummaryRow {
    pub good_id: Uuid,
    pub good_name: String,
    pub origin: String,
    pub unit_type: String,
    #[schema(example = "50")]
    pub pledged_quantity: Decimal,
    #[schema(example = "30")]
    pub remaining_quantity: Decimal,
}

// --- Ledger row joined back to shipment code and customer name ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub id: Uuid,
    pub good_id: Uuid,
    pub good_name: String,
    pub direction: Direction,
    pub quantity: Decimal,
    pub shipment_id: Option<i64>,
    pub shipment_code: Option<String>,
    pub shipment_good_id: Option<Uuid>,
    pub step_id: Option<i64>,
    pub customer_party_id: Option<i64>,
    pub customer_name: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
