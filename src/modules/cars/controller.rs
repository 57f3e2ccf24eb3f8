use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::cars::model::{Car, CreateCarDto, UpdateCarDto};
use crate::modules::cars::service::CarService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/cars",
    request_body = CreateCarDto,
    responses(
        (status = 201, description = "Car created", body = Car),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
#[instrument(skip(state, dto))]
pub async fn create_car(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateCarDto>,
) -> Result<(StatusCode, Json<Car>), AppError> {
    let car = CarService::create_car(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

#[utoipa::path(
    get,
    path = "/api/cars",
    responses((status = 200, description = "List of cars", body = [Car])),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
#[instrument(skip(state))]
pub async fn get_cars(State(state): State<AppState>) -> Result<Json<Vec<Car>>, AppError> {
    let cars = CarService::get_cars(&state.db).await?;
    Ok(Json(cars))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car details", body = Car),
        (status = 404, description = "Car not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Car>, AppError> {
    let car = CarService::get_car_by_id(&state.db, id).await?;
    Ok(Json(car))
}

#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    request_body = UpdateCarDto,
    responses(
        (status = 200, description = "Car updated", body = Car),
        (status = 404, description = "Car not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
#[instrument(skip(state, dto))]
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCarDto>,
) -> Result<Json<Car>, AppError> {
    let car = CarService::update_car(&state.db, id, dto).await?;
    Ok(Json(car))
}

#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car deleted"),
        (status = 404, description = "Car not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
#[instrument(skip(state))]
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    CarService::delete_car(&state.db, id).await?;
    Ok(Json(json!({"message": "Car deleted successfully"})))
}
