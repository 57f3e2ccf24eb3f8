use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::instructors::model::{CreateInstructorDto, Instructor, UpdateInstructorDto};
use crate::modules::instructors::service::InstructorService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/instructors",
    request_body = CreateInstructorDto,
    responses(
        (status = 201, description = "Instructor created", body = Instructor),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state, dto))]
pub async fn create_instructor(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateInstructorDto>,
) -> Result<(StatusCode, Json<Instructor>), AppError> {
    let instructor = InstructorService::create_instructor(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

#[utoipa::path(
    get,
    path = "/api/instructors",
    responses((status = 200, description = "List of instructors", body = [Instructor])),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn get_instructors(
    State(state): State<AppState>,
) -> Result<Json<Vec<Instructor>>, AppError> {
    let instructors = InstructorService::get_instructors(&state.db).await?;
    Ok(Json(instructors))
}

#[utoipa::path(
    get,
    path = "/api/instructors/{id}",
    params(("id" = Uuid, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor details", body = Instructor),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = InstructorService::get_instructor_by_id(&state.db, id).await?;
    Ok(Json(instructor))
}

#[utoipa::path(
    put,
    path = "/api/instructors/{id}",
    params(("id" = Uuid, Path, description = "Instructor ID")),
    request_body = UpdateInstructorDto,
    responses(
        (status = 200, description = "Instructor updated", body = Instructor),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state, dto))]
pub async fn update_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateInstructorDto>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = InstructorService::update_instructor(&state.db, id, dto).await?;
    Ok(Json(instructor))
}

#[utoipa::path(
    delete,
    path = "/api/instructors/{id}",
    params(("id" = Uuid, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor deleted"),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn delete_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    InstructorService::delete_instructor(&state.db, id).await?;
    Ok(Json(json!({"message": "Instructor deleted successfully"})))
}
