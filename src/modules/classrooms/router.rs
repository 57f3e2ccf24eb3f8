use crate::modules::classrooms::controller::{
    create_classroom, delete_classroom, get_classroom, get_classrooms, update_classroom,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_classroom).get(get_classrooms))
        .route(
            "/{id}",
            get(get_classroom)
                .put(update_classroom)
                .delete(delete_classroom),
        )
}
