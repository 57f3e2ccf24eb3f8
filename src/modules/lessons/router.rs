use crate::modules::lessons::controller::{
    create_lesson, delete_lesson, get_lesson, get_lessons, update_lesson,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_lessons_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_lesson).get(get_lessons))
        .route(
            "/{id}",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
}
