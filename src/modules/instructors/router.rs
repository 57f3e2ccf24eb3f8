use crate::modules::instructors::controller::{
    create_instructor, delete_instructor, get_instructor, get_instructors, update_instructor,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_instructors_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_instructor).get(get_instructors))
        .route(
            "/{id}",
            get(get_instructor)
                .put(update_instructor)
                .delete(delete_instructor),
        )
}
