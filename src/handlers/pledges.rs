// src/handlers/pledges.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Caller,
    models::{
        allocations::ShipmentGoodsAllocation,
        pledges::{CustomerScope, PledgeView, ShipmentGood},
    },
    services::pledge_service::PledgeGood,
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Value must not be negative.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: RegisterPledge
// ---
// The good is either an existing id or a name (+ origin) to get-or-create.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPledgePayload {
    pub good_id: Option<Uuid>,

    #[schema(example = "Steel Pipes")]
    pub good_name: Option<String>,

    #[schema(example = "China")]
    pub origin: Option<String>,

    #[schema(example = "pcs")]
    pub unit_type: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "50")]
    pub quantity: Decimal,

    pub customer_party_id: Option<i64>,

    #[serde(default)]
    pub applies_to_all_customers: bool,
}

impl RegisterPledgePayload {
    fn good(&self) -> Result<PledgeGood<'_>, AppError> {
        match (self.good_id, self.good_name.as_deref()) {
            (Some(id), None) => Ok(PledgeGood::Id(id)),
            (None, Some(name)) => Ok(PledgeGood::Named {
                name,
                origin: self.origin.as_deref(),
                unit_type: self.unit_type.as_deref(),
            }),
            _ => Err(field_error("goodId", "GoodIdOrNameRequired")),
        }
    }

    fn scope(&self) -> Result<CustomerScope, AppError> {
        CustomerScope::from_parts(self.applies_to_all_customers, self.customer_party_id)
            .ok_or_else(|| field_error("customerPartyId", "CustomerOrAllCustomersRequired"))
    }
}

fn field_error(field: &'static str, code: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code));
    AppError::ValidationError(errors)
}

// POST /api/shipments/{id}/goods
#[utoipa::path(
    post,
    path = "/api/shipments/{id}/goods",
    tag = "Pledges",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = RegisterPledgePayload,
    responses(
        (status = 201, description = "Pledge created and goods received", body = ShipmentGood),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown good or shipment not held by the owner")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_pledge(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(shipment_id): Path<i64>,
    Json(payload): Json<RegisterPledgePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let good = payload.good()?;
    let scope = payload.scope()?;

    let pledge = app_state
        .pledge_service
        .register_pledge(
            &app_state.db_pool,
            shipment_id,
            caller.owner_id,
            good,
            payload.quantity,
            scope,
            Some(caller.user_id),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pledge)))
}

// GET /api/shipments/{id}/goods
#[utoipa::path(
    get,
    path = "/api/shipments/{id}/goods",
    tag = "Pledges",
    params(("id" = i64, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Pledges with allocated and remaining quantity", body = Vec<PledgeView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pledges(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(shipment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pledges = app_state
        .pledge_service
        .list_pledges(shipment_id, caller.owner_id)
        .await?;
    Ok((StatusCode::OK, Json(pledges)))
}

// DELETE /api/pledges/{id}
#[utoipa::path(
    delete,
    path = "/api/pledges/{id}",
    tag = "Pledges",
    params(("id" = Uuid, Path, description = "Pledge id")),
    responses(
        (status = 204, description = "Pledge removed; ledger history is kept"),
        (status = 404, description = "Unknown pledge")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_pledge(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(pledge_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .pledge_service
        .remove_pledge(&app_state.db_pool, pledge_id, caller.owner_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/pledges/{id}/allocations
#[utoipa::path(
    get,
    path = "/api/pledges/{id}/allocations",
    tag = "Pledges",
    params(("id" = Uuid, Path, description = "Pledge id")),
    responses(
        (status = 200, description = "Allocations recorded against the pledge", body = Vec<ShipmentGoodsAllocation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pledge_allocations(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(pledge_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .allocation_service
        .list_pledge_allocations(caller.owner_id, pledge_id)
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> RegisterPledgePayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn good_by_name_with_all_customers() {
        let p = payload(serde_json::json!({
            "goodName": "Steel Pipes",
            "origin": "China",
            "quantity": 50,
            "appliesToAllCustomers": true
        }));
        assert!(p.validate().is_ok());
        assert!(matches!(p.good(), Ok(PledgeGood::Named { name: "Steel Pipes", .. })));
        assert_eq!(p.scope().unwrap(), CustomerScope::AllCustomers);
    }

    #[test]
    fn good_id_and_name_together_are_rejected() {
        let p = payload(serde_json::json!({
            "goodId": Uuid::nil(),
            "goodName": "Steel Pipes",
            "quantity": 5,
            "customerPartyId": 7
        }));
        assert!(matches!(p.good(), Err(AppError::ValidationError(_))));
        assert_eq!(p.scope().unwrap(), CustomerScope::Customer(7));
    }

    #[test]
    fn missing_scope_is_rejected() {
        let p = payload(serde_json::json!({ "goodId": Uuid::nil(), "quantity": 5 }));
        assert!(matches!(p.scope(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn negative_quantity_fails_validation() {
        let p = payload(serde_json::json!({
            "goodId": Uuid::nil(),
            "quantity": -1,
            "appliesToAllCustomers": true
        }));
        assert!(p.validate().is_err());
    }
}
