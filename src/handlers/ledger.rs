// src/handlers/ledger.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Caller,
    models::ledger::{BalanceAudit, BalanceView},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub good_id: Uuid,
    #[schema(example = "30")]
    pub quantity: Decimal,
}

// GET /api/goods/{id}/balance
#[utoipa::path(
    get,
    path = "/api/goods/{id}/balance",
    tag = "Ledger",
    params(("id" = Uuid, Path, description = "Good id")),
    responses(
        (status = 200, description = "Current balance (0 when nothing recorded)", body = BalanceResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_balance(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(good_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quantity = app_state
        .ledger_service
        .get_balance(caller.owner_id, good_id)
        .await?;
    Ok((StatusCode::OK, Json(BalanceResponse { good_id, quantity })))
}

// POST /api/goods/{id}/balance/recompute
#[utoipa::path(
    post,
    path = "/api/goods/{id}/balance/recompute",
    tag = "Ledger",
    params(("id" = Uuid, Path, description = "Good id")),
    responses(
        (status = 200, description = "Stored vs. ledger balance before repair", body = BalanceAudit)
    ),
    security(("api_jwt" = []))
)]
pub async fn recompute_balance(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(good_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Only touch goods the caller owns.
    app_state
        .catalog_service
        .get_good(&app_state.db_pool, caller.owner_id, good_id)
        .await?;

    let audit = app_state
        .ledger_service
        .recompute_balance(&app_state.db_pool, caller.owner_id, good_id)
        .await?;
    Ok((StatusCode::OK, Json(audit)))
}

// GET /api/balances
#[utoipa::path(
    get,
    path = "/api/balances",
    tag = "Ledger",
    responses(
        (status = 200, description = "Balances of every good of the owner", body = Vec<BalanceView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_balances(
    State(app_state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let balances = app_state.summary_service.owner_balances(caller.owner_id).await?;
    Ok((StatusCode::OK, Json(balances)))
}

// GET /api/balances/audit
#[utoipa::path(
    get,
    path = "/api/balances/audit",
    tag = "Ledger",
    responses(
        (status = 200, description = "Drift report, no changes made", body = Vec<BalanceAudit>)
    ),
    security(("api_jwt" = []))
)]
pub async fn audit_balances(
    State(app_state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let audits = app_state.ledger_service.audit_balances(caller.owner_id).await?;
    Ok((StatusCode::OK, Json(audits)))
}
