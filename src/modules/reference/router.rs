use crate::modules::reference::controller::{get_categories, get_exam_types, get_lesson_topics};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_reference_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/lesson-topics", get(get_lesson_topics))
        .route("/exam-types", get(get_exam_types))
}
