// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Builds the full router. Everything under `/api` except health needs a bearer token.
pub fn app(app_state: AppState) -> Router {
    let goods_routes = Router::new()
        .route("/goods"
               ,post(handlers::goods::ensure_good)
               .get(handlers::goods::list_goods)
        )
        .route("/goods/{id}", get(handlers::goods::get_good))
        .route("/goods/{id}/balance", get(handlers::ledger::get_balance))
        .route("/goods/{id}/balance/recompute", post(handlers::ledger::recompute_balance))
        .route("/balances", get(handlers::ledger::list_balances))
        .route("/balances/audit", get(handlers::ledger::audit_balances));

    let shipment_routes = Router::new()
        .route("/shipments/{id}/goods"
               ,post(handlers::pledges::register_pledge)
               .get(handlers::pledges::list_pledges)
        )
        .route("/shipments/{id}/steps/{step_id}/allocations"
               ,post(handlers::allocations::apply_allocations)
        )
        .route("/steps/{step_id}/allocations", get(handlers::allocations::list_step_allocations))
        .route("/pledges/{id}", delete(handlers::pledges::remove_pledge))
        .route("/pledges/{id}/allocations", get(handlers::pledges::list_pledge_allocations));

    let summary_routes = Router::new()
        .route("/shipments/{id}/summary", get(handlers::summary::shipment_summary))
        .route("/shipments/{id}/transactions", get(handlers::summary::shipment_transactions))
        .route("/customers/{id}/summary", get(handlers::summary::customer_summary))
        .route("/customers/{id}/transactions", get(handlers::summary::customer_transactions));

    let protected = Router::new()
        .merge(goods_routes)
        .merge(shipment_routes)
        .merge(summary_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
}
