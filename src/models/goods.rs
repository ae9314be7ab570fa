// src/models/goods.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Good Catalog ---
// One row per (owner, name, origin). Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Good {
    pub id: Uuid,
    #[schema(ignore)]
    pub owner_id: i64,
    #[schema(example = "Steel Pipes")]
    pub name: String,
    #[schema(example = "China")]
    pub origin: String,
    #[schema(example = "pcs")]
    pub unit_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Natural key of a good after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodKey {
    pub name: String,
    pub origin: String,
}

impl GoodKey {
    /// Trims both parts; a missing origin becomes the empty string so the
    /// unique constraint compares it like any other value.
    pub fn new(name: &str, origin: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            origin: origin.map(str::trim).unwrap_or_default().to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_trimmed_and_origin_defaults_to_empty() {
        let key = GoodKey::new("  Steel Pipes ", None);
        assert_eq!(key.name, "Steel Pipes");
        assert_eq!(key.origin, "");
        assert!(key.is_valid());

        let key = GoodKey::new("Steel Pipes", Some(" China "));
        assert_eq!(key.origin, "China");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(!GoodKey::new("   ", Some("China")).is_valid());
    }
}
