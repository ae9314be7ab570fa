// src/handlers/allocations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Caller,
    models::allocations::{AllocationReport, AllocationRequest, ShipmentGoodsAllocation},
};

// Body sent by the workflow engine when a step completes.
// Quantities are not validated here: out-of-range requests are clamped, never rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAllocationsPayload {
    #[serde(default)]
    pub requests: Vec<AllocationRequest>,
}

// POST /api/shipments/{id}/steps/{stepId}/allocations
#[utoipa::path(
    post,
    path = "/api/shipments/{id}/steps/{step_id}/allocations",
    tag = "Allocations",
    params(
        ("id" = i64, Path, description = "Shipment id"),
        ("step_id" = i64, Path, description = "Workflow step id")
    ),
    request_body = ApplyAllocationsPayload,
    responses(
        (status = 200, description = "Per-request outcome; skips are not errors", body = AllocationReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_allocations(
    State(app_state): State<AppState>,
    caller: Caller,
    Path((shipment_id, step_id)): Path<(i64, i64)>,
    Json(payload): Json<ApplyAllocationsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .allocation_service
        .apply_allocations(
            &app_state.db_pool,
            shipment_id,
            step_id,
            caller.owner_id,
            &payload.requests,
            Some(caller.user_id),
        )
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/steps/{stepId}/allocations
#[utoipa::path(
    get,
    path = "/api/steps/{step_id}/allocations",
    tag = "Allocations",
    params(("step_id" = i64, Path, description = "Workflow step id")),
    responses(
        (status = 200, description = "Allocations recorded by the step", body = Vec<ShipmentGoodsAllocation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_step_allocations(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(step_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .allocation_service
        .list_step_allocations(caller.owner_id, step_id)
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn negative_quantities_are_accepted_for_clamping() {
        let payload: ApplyAllocationsPayload = serde_json::from_value(serde_json::json!({
            "requests": [
                { "pledgeId": uuid::Uuid::nil(), "requestedQuantity": -3 },
                { "pledgeId": uuid::Uuid::nil(), "requestedQuantity": 2.5 }
            ]
        }))
        .unwrap();
        assert_eq!(payload.requests.len(), 2);
        assert_eq!(payload.requests[0].requested_quantity, Decimal::from(-3));
    }

    #[test]
    fn missing_requests_means_empty_batch() {
        let payload: ApplyAllocationsPayload = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(payload.requests.is_empty());
    }
}
