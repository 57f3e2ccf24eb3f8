mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{
    admin_token, create_test_car, create_test_classroom, create_test_instructor,
    create_test_teacher, setup_test_app,
};
use http_body_util::BodyExt;
use rand::{Rng, SeedableRng, rngs::StdRng};
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

fn practice_booking(
    examiner_id: Uuid,
    location_id: Uuid,
    start: &str,
    end: &str,
) -> serde_json::Value {
    json!({
        "start_time": start,
        "end_time": end,
        "type": "practice",
        "examiner_id": examiner_id,
        "location_id": location_id
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn book_practice_exam_returns_resolved_details(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let car = create_test_car(&pool, "KA-1234").await;

    let (status, body) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["exam_type"], "practice");
    assert_eq!(body["examiner_role"], "instructor");
    assert_eq!(body["examiner_id"], json!(instructor.to_string()));
    assert_eq!(body["location"], "Skoda Fabia (KA-1234)");
    assert!(body["exam_location_id"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn overlapping_exam_for_same_examiner_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let car_a = create_test_car(&pool, "KA-0001").await;
    let car_b = create_test_car(&pool, "KA-0002").await;

    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car_a,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Different car, same instructor, overlapping window.
    let (status, body) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car_b,
            "2026-09-10T10:30:00Z",
            "2026-09-10T11:30:00Z",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Examiner has a conflicting exam at this time");
}

#[sqlx::test(migrations = "./migrations")]
async fn overlapping_exam_for_same_car_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let first = create_test_instructor(&pool, None).await;
    let second = create_test_instructor(&pool, None).await;
    let car = create_test_car(&pool, "KA-0003").await;

    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            first,
            car,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            second,
            car,
            "2026-09-10T10:30:00Z",
            "2026-09-10T11:30:00Z",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Location is already booked at this time");
}

#[sqlx::test(migrations = "./migrations")]
async fn back_to_back_exams_do_not_conflict(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let car = create_test_car(&pool, "KA-0004").await;

    let (status, first) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Starts exactly when the first one ends.
    let (status, second) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T11:00:00Z",
            "2026-09-10T12:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same car resolves to the same memoized location row.
    assert_eq!(first["exam_location_id"], second["exam_location_id"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn overlapping_theory_exams_in_same_classroom_are_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let first = create_test_teacher(&pool, None).await;
    let second = create_test_teacher(&pool, None).await;
    let classroom = create_test_classroom(&pool, "Room 101", true).await;

    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(json!({
            "start_time": "2026-09-11T09:00:00Z",
            "end_time": "2026-09-11T10:00:00Z",
            "type": "theory",
            "examiner_id": first,
            "location_id": classroom
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(json!({
            "start_time": "2026-09-11T09:30:00Z",
            "end_time": "2026-09-11T10:30:00Z",
            "type": "theory",
            "examiner_id": second,
            "location_id": classroom
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Location is already booked at this time");
}

#[sqlx::test(migrations = "./migrations")]
async fn updating_an_exam_does_not_conflict_with_itself(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let car = create_test_car(&pool, "KA-0005").await;

    let (status, created) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let exam_id = created["id"].as_str().unwrap().to_string();

    // Shift the same exam by 15 minutes; its own row must not count as a conflict.
    let (status, updated) = send_json(
        app,
        "PUT",
        &format!("/api/exams/{}", exam_id),
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T10:15:00Z",
            "2026-09-10T11:15:00Z",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["start_time"], "2026-09-10T10:15:00Z");
}

#[sqlx::test(migrations = "./migrations")]
async fn theory_exam_with_instructor_examiner_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let classroom = create_test_classroom(&pool, "Room 102", true).await;

    let (status, body) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(json!({
            "start_time": "2026-09-12T09:00:00Z",
            "end_time": "2026-09-12T10:00:00Z",
            "type": "theory",
            "examiner_id": instructor,
            "location_id": classroom
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid examiner: no teacher with id")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn theory_exam_in_unavailable_classroom_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let teacher = create_test_teacher(&pool, None).await;
    let classroom = create_test_classroom(&pool, "Closed room", false).await;

    let (status, body) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(json!({
            "start_time": "2026-09-12T09:00:00Z",
            "end_time": "2026-09-12T10:00:00Z",
            "type": "theory",
            "examiner_id": teacher,
            "location_id": classroom
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid location: classroom is not available");
}

#[sqlx::test(migrations = "./migrations")]
async fn exam_must_end_after_it_starts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let car = create_test_car(&pool, "KA-0006").await;

    let (status, _) = send_json(
        app,
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T11:00:00Z",
            "2026-09-10T10:00:00Z",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Seeded intervals inside a single working day, minute granularity.
fn random_intervals(seed: u64, n: usize) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc.with_ymd_and_hms(2026, 9, 14, 8, 0, 0).unwrap();
    (0..n)
        .map(|_| {
            let start = base + Duration::minutes(rng.gen_range(0..540));
            let end = start + Duration::minutes(rng.gen_range(30..=120));
            (start, end)
        })
        .collect()
}

fn overlaps_any(
    accepted: &[(DateTime<Utc>, DateTime<Utc>)],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    accepted.iter().any(|&(s, e)| s < end && start < e)
}

#[sqlx::test(migrations = "./migrations")]
async fn random_bookings_for_one_examiner_admit_exactly_the_conflict_free_subset(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;
    let instructor = create_test_instructor(&pool, None).await;

    let mut accepted: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    let mut conflicts = 0;

    for (i, (start, end)) in random_intervals(42, 14).into_iter().enumerate() {
        // A fresh car per attempt keeps the location axis out of play.
        let car = create_test_car(&pool, &format!("KA-R1{:02}", i)).await;
        let (status, body) = send_json(
            app.clone(),
            "POST",
            "/api/exams",
            &token,
            Some(practice_booking(
                instructor,
                car,
                &start.to_rfc3339(),
                &end.to_rfc3339(),
            )),
        )
        .await;

        if overlaps_any(&accepted, start, end) {
            assert_eq!(status, StatusCode::BAD_REQUEST, "interval {} must conflict", i);
            assert_eq!(body["error"], "Examiner has a conflicting exam at this time");
            conflicts += 1;
        } else {
            assert_eq!(status, StatusCode::CREATED, "interval {} must be free", i);
            accepted.push((start, end));
        }
    }

    assert!(!accepted.is_empty());
    assert!(conflicts > 0, "seed produced no overlapping intervals");

    // Exactly the accepted subset was persisted.
    let (status, body) = send_json(app, "GET", "/api/exams", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), accepted.len());
}

#[sqlx::test(migrations = "./migrations")]
async fn random_bookings_for_one_car_admit_exactly_the_conflict_free_subset(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;
    let car = create_test_car(&pool, "KA-R200").await;

    let mut accepted: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    let mut conflicts = 0;

    for (i, (start, end)) in random_intervals(7, 14).into_iter().enumerate() {
        // A fresh instructor per attempt keeps the examiner axis out of play.
        let instructor = create_test_instructor(&pool, None).await;
        let (status, body) = send_json(
            app.clone(),
            "POST",
            "/api/exams",
            &token,
            Some(practice_booking(
                instructor,
                car,
                &start.to_rfc3339(),
                &end.to_rfc3339(),
            )),
        )
        .await;

        if overlaps_any(&accepted, start, end) {
            assert_eq!(status, StatusCode::BAD_REQUEST, "interval {} must conflict", i);
            assert_eq!(body["error"], "Location is already booked at this time");
            conflicts += 1;
        } else {
            assert_eq!(status, StatusCode::CREATED, "interval {} must be free", i);
            accepted.push((start, end));
        }
    }

    assert!(!accepted.is_empty());
    assert!(conflicts > 0, "seed produced no overlapping intervals");

    let (status, body) = send_json(app, "GET", "/api/exams", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), accepted.len());
}

#[sqlx::test(migrations = "./migrations")]
async fn updating_unknown_exam_returns_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let instructor = create_test_instructor(&pool, None).await;
    let car = create_test_car(&pool, "KA-0009").await;

    let (status, body) = send_json(
        app,
        "PUT",
        &format!("/api/exams/{}", Uuid::new_v4()),
        &token,
        Some(practice_booking(
            instructor,
            car,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Exam not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_unknown_exam_returns_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    let (status, body) = send_json(
        app,
        "DELETE",
        &format!("/api/exams/{}", Uuid::new_v4()),
        &token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Exam not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn examiner_sees_only_their_own_exams(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&pool, app.clone()).await;

    // Two instructors with logins; one exam each.
    let password = "testpass123";
    let mine_email = common::generate_unique_email();
    let mine_user = common::create_test_user(&pool, &mine_email, password, "instructor").await;
    let mine = create_test_instructor(&pool, Some(mine_user)).await;
    let other = create_test_instructor(&pool, None).await;

    let car_a = create_test_car(&pool, "KA-0007").await;
    let car_b = create_test_car(&pool, "KA-0008").await;

    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            mine,
            car_a,
            "2026-09-10T10:00:00Z",
            "2026-09-10T11:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/exams",
        &token,
        Some(practice_booking(
            other,
            car_b,
            "2026-09-10T12:00:00Z",
            "2026-09-10T13:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let instructor_token = common::get_auth_token(app.clone(), &mine_email, password).await;
    let (status, body) =
        send_json(app, "GET", "/api/examiner/exams", &instructor_token, None).await;

    assert_eq!(status, StatusCode::OK);
    let exams = body.as_array().unwrap();
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0]["examiner_id"], json!(mine.to_string()));
}

#[sqlx::test(migrations = "./migrations")]
async fn exam_routes_require_admin_role(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let password = "testpass123";
    let email = common::generate_unique_email();
    common::create_test_user(&pool, &email, password, "teacher").await;
    let token = common::get_auth_token(app.clone(), &email, password).await;

    let (status, _) = send_json(app, "GET", "/api/exams", &token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
