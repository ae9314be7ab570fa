// Router-level checks that never reach the database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use goods_ledger::{config::AppState, middleware::auth::Claims};

const SECRET: &str = "http-test-secret";

fn app() -> Router {
    // Lazy: no connection is opened unless a handler touches the pool.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://127.0.0.1:1/unused")
        .unwrap();
    goods_ledger::app(AppState::from_pool(pool, SECRET.to_string()))
}

fn bearer(secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: 42,
        owner: 1,
        all_shipments: true,
        exp: (now + 600) as usize,
        iat: now as usize,
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap();
    format!("Bearer {token}")
}

#[tokio::test]
async fn health_is_public() {
    let response = app()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let response = app()
        .oneshot(Request::builder().uri("/api/goods").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/balances")
                .header(header::AUTHORIZATION, bearer("not-the-secret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_pledge_payload_is_a_bad_request() {
    // Validation runs before any query, so the lazy pool is never used.
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/shipments/100/goods")
                .header(header::AUTHORIZATION, bearer(SECRET))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"goodName":"Steel Pipes","quantity":-5,"appliesToAllCustomers":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_allocation_batch_is_a_no_op() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/shipments/100/steps/10/allocations")
                .header(header::AUTHORIZATION, bearer(SECRET))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"requests":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = app()
        .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn negative_requested_quantity_is_not_a_bad_request() {
    // Passes the boundary untouched; only the unreachable pool makes it fail.
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/shipments/100/steps/10/allocations")
                .header(header::AUTHORIZATION, bearer(SECRET))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"requests":[{"pledgeId":"00000000-0000-0000-0000-000000000000","requestedQuantity":-3}]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
