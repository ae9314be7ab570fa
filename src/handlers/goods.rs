// src/handlers/goods.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Caller,
    models::goods::Good,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnsureGoodPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    #[schema(example = "Steel Pipes")]
    pub name: String,

    #[schema(example = "China")]
    pub origin: Option<String>,

    #[schema(example = "pcs")]
    pub unit_type: Option<String>,
}

// POST /api/goods
#[utoipa::path(
    post,
    path = "/api/goods",
    tag = "Goods",
    request_body = EnsureGoodPayload,
    responses(
        (status = 200, description = "Existing or newly created good", body = Good)
    ),
    security(("api_jwt" = []))
)]
pub async fn ensure_good(
    State(app_state): State<AppState>,
    caller: Caller,
    Json(payload): Json<EnsureGoodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let good = app_state
        .catalog_service
        .ensure_good(
            &app_state.db_pool,
            caller.owner_id,
            &payload.name,
            payload.origin.as_deref(),
            payload.unit_type.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(good)))
}

// GET /api/goods
#[utoipa::path(
    get,
    path = "/api/goods",
    tag = "Goods",
    responses(
        (status = 200, description = "Goods of the owner", body = Vec<Good>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_goods(
    State(app_state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let goods = app_state.catalog_service.list_goods(caller.owner_id).await?;
    Ok((StatusCode::OK, Json(goods)))
}

// GET /api/goods/{id}
#[utoipa::path(
    get,
    path = "/api/goods/{id}",
    tag = "Goods",
    params(("id" = Uuid, Path, description = "Good id")),
    responses(
        (status = 200, description = "The good", body = Good),
        (status = 404, description = "Unknown good")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_good(
    State(app_state): State<AppState>,
    caller: Caller,
    Path(good_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let good = app_state
        .catalog_service
        .get_good(&app_state.db_pool, caller.owner_id, good_id)
        .await?;
    Ok((StatusCode::OK, Json(good)))
}
