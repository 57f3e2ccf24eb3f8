use crate::modules::exams::controller::{
    create_exam, delete_exam, get_exam, get_exam_locations, get_examiners, get_exams, get_my_exams,
    update_exam,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_exams_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_exam).get(get_exams))
        .route(
            "/{id}",
            get(get_exam).put(update_exam).delete(delete_exam),
        )
}

/// Candidate lookups used when composing a booking.
pub fn init_exam_lookup_router() -> Router<AppState> {
    Router::new()
        .route("/examiners", get(get_examiners))
        .route("/exam-locations", get(get_exam_locations))
}

/// Caller-scoped view for instructor and teacher principals.
pub fn init_my_exams_router() -> Router<AppState> {
    Router::new().route("/exams", get(get_my_exams))
}
