mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{admin_token, category_id, generate_unique_email, setup_test_app};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, body)
}

fn student_payload(email: &str, category: Uuid) -> serde_json::Value {
    json!({
        "first_name": "Ada",
        "last_name": "Novak",
        "email": email,
        "birth_date": "2001-05-14",
        "category_id": category
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn create_and_fetch_student(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;
    let category = category_id(&pool, "B").await;

    let email = generate_unique_email();
    let (status, created) = send_json(
        app.clone(),
        "POST",
        "/api/students",
        &token,
        Some(student_payload(&email, category)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], json!(email));

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send_json(
        app,
        "GET",
        &format!("/api/students/{}", id),
        &token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["first_name"], "Ada");
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_student_email_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;
    let category = category_id(&pool, "B").await;

    let email = generate_unique_email();
    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/students",
        &token,
        Some(student_payload(&email, category)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/students",
        &token,
        Some(student_payload(&email, category)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!(format!("Student with email {} already exists", email))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_category_reference_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let (status, body) = send_json(
        app,
        "POST",
        "/api/students",
        &token,
        Some(student_payload(&generate_unique_email(), Uuid::new_v4())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Unknown category, group or instructor reference"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn fetching_unknown_student_returns_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let (status, body) = send_json(
        app,
        "GET",
        &format!("/api/students/{}", Uuid::new_v4()),
        &token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Student not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn student_report_renders_json_and_csv(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;
    let category = category_id(&pool, "B").await;

    let email = generate_unique_email();
    let (status, created) = send_json(
        app.clone(),
        "POST",
        "/api/students",
        &token,
        Some(student_payload(&email, category)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, report) = send_json(
        app.clone(),
        "GET",
        &format!("/api/students/{}/report?format=json", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["email"], json!(email));
    assert!(report["category"].as_str().unwrap().starts_with("B "));
    assert!(report["lessons"].as_array().unwrap().is_empty());

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/students/{}/report?format=csv", id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Ada Novak"));
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_report_format_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;
    let category = category_id(&pool, "B").await;

    let (status, created) = send_json(
        app.clone(),
        "POST",
        "/api/students",
        &token,
        Some(student_payload(&generate_unique_email(), category)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        app,
        "GET",
        &format!("/api/students/{}/report?format=xlsx", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
