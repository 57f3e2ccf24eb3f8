use crate::modules::cars::controller::{create_car, delete_car, get_car, get_cars, update_car};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_cars_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_car).get(get_cars))
        .route("/{id}", get(get_car).put(update_car).delete(delete_car))
}
