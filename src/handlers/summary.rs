// src/handlers/summary.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Caller,
    models::summary::{GoodsSummaryRow, HistoryRow},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Max rows, default 100.
    pub limit: Option<i64>,
}

// GET /api/customers/{id}/summary
#[utoipa::path(
    get,
    path = "/api/customers/{id}/summary",
    tag = "Summary",
    params(("id" = i64, Path, description = "Customer party id")),
    responses(
        (status = 200, description = "Pledged and remaining quantity per good", body = Vec<GoodsSummaryRow>)
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_summary(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(customer_party_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .summary_service
        .customer_goods_summary(caller.owner_id, customer_party_id, caller.scope())
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/shipments/{id}/summary
#[utoipa::path(
    get,
    path = "/api/shipments/{id}/summary",
    tag = "Summary",
    params(("id" = i64, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Pledged and remaining quantity per good", body = Vec<GoodsSummaryRow>)
    ),
    security(("api_jwt" = []))
)]
pub async fn shipment_summary(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(shipment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .summary_service
        .shipment_goods_summary(caller.owner_id, shipment_id, caller.scope())
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/shipments/{id}/transactions
#[utoipa::path(
    get,
    path = "/api/shipments/{id}/transactions",
    tag = "Summary",
    params(("id" = i64, Path, description = "Shipment id"), HistoryQuery),
    responses(
        (status = 200, description = "Ledger rows, newest first", body = Vec<HistoryRow>)
    ),
    security(("api_jwt" = []))
)]
pub async fn shipment_transactions(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(shipment_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .summary_service
        .shipment_history(caller.owner_id, shipment_id, caller.scope(), query.limit)
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/customers/{id}/transactions
#[utoipa::path(
    get,
    path = "/api/customers/{id}/transactions",
    tag = "Summary",
    params(("id" = i64, Path, description = "Customer party id"), HistoryQuery),
    responses(
        (status = 200, description = "Ledger rows, newest first", body = Vec<HistoryRow>)
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_transactions(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(customer_party_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .summary_service
        .customer_history(caller.owner_id, customer_party_id, caller.scope(), query.limit)
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}
