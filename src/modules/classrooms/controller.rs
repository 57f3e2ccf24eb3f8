use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::classrooms::model::{Classroom, CreateClassroomDto, UpdateClassroomDto};
use crate::modules::classrooms::service::ClassroomService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created", body = Classroom),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classrooms"
)]
#[instrument(skip(state, dto))]
pub async fn create_classroom(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    let classroom = ClassroomService::create_classroom(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/classrooms",
    responses((status = 200, description = "List of classrooms", body = [Classroom])),
    security(("bearer_auth" = [])),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_classrooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<Classroom>>, AppError> {
    let classrooms = ClassroomService::get_classrooms(&state.db).await?;
    Ok(Json(classrooms))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom details", body = Classroom),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_classroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::get_classroom_by_id(&state.db, id).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    put,
    path = "/api/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    request_body = UpdateClassroomDto,
    responses(
        (status = 200, description = "Classroom updated", body = Classroom),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classrooms"
)]
#[instrument(skip(state, dto))]
pub async fn update_classroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClassroomDto>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::update_classroom(&state.db, id, dto).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    delete,
    path = "/api/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom deleted"),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn delete_classroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    ClassroomService::delete_classroom(&state.db, id).await?;
    Ok(Json(json!({"message": "Classroom deleted successfully"})))
}
