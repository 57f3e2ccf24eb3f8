mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_user, generate_unique_email, setup_test_app};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn login(
    app: axum::Router,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, body)
}

#[sqlx::test(migrations = "./migrations")]
async fn login_returns_token_and_user(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&pool, &email, password, "admin").await;

    let (status, body) = login(app, json!({"email": email, "password": password})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["email"], json!(email));
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn login_with_wrong_password_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let email = generate_unique_email();
    create_test_user(&pool, &email, "correct-password", "admin").await;

    let (status, body) = login(app, json!({"email": email, "password": "wrong"})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[sqlx::test(migrations = "./migrations")]
async fn login_with_unknown_email_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let (status, body) = login(
        app,
        json!({"email": generate_unique_email(), "password": "whatever"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[sqlx::test(migrations = "./migrations")]
async fn login_with_missing_field_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let (status, _) = login(app, json!({"email": "someone@example.com"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn protected_route_without_token_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/api/students")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
