use axum::body::Body;
use axum::http::Request;
use drivedesk::config::email::EmailConfig;
use drivedesk::config::jwt::JwtConfig;
use drivedesk::router::init_router;
use drivedesk::state::AppState;
use drivedesk::utils::password::hash_password;
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        email_config: EmailConfig::default(),
    };
    init_router(state)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Creates a login with the given role ('admin', 'teacher' or 'instructor')
/// and returns its user id.
pub async fn create_test_user(pool: &PgPool, email: &str, password: &str, role: &str) -> Uuid {
    let hashed = hash_password(password).unwrap();

    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (first_name, last_name, email, password, role)
        VALUES ('Test', 'User', $1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

/// Logs in as a freshly created admin and returns a usable bearer token.
#[allow(dead_code)]
pub async fn admin_token(pool: &PgPool, app: axum::Router) -> String {
    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(pool, &email, password, "admin").await;
    get_auth_token(app, &email, password).await
}

#[allow(dead_code)]
pub async fn create_test_teacher(pool: &PgPool, user_id: Option<Uuid>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO teachers (user_id, first_name, last_name, email)
        VALUES ($1, 'Tess', 'Ora', $2)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(generate_unique_email())
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_instructor(pool: &PgPool, user_id: Option<Uuid>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO instructors (user_id, first_name, last_name, email)
        VALUES ($1, 'Igor', 'Drive', $2)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(generate_unique_email())
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_classroom(pool: &PgPool, name: &str, available: bool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO classrooms (name, capacity, available)
        VALUES ($1, 20, $2)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(available)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_car(pool: &PgPool, registration: &str) -> Uuid {
    let category = category_id(pool, "B").await;
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO cars (make, model, registration, category_id)
        VALUES ('Skoda', 'Fabia', $1, $2)
        RETURNING id
        "#,
    )
    .bind(registration)
    .bind(category)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Looks up a seeded licence category by code.
#[allow(dead_code)]
pub async fn category_id(pool: &PgPool, code: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE code = $1")
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}
