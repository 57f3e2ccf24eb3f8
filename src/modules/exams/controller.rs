use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::exams::model::{
    BookExamDto, ExamDetails, ExamQueryParams, ExamType, ExamTypeParam, ExaminerOption,
    LocationOption,
};
use crate::modules::exams::service::ExamService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/exams",
    params(ExamQueryParams),
    responses(
        (status = 200, description = "List of exams with resolved examiner and location", body = [ExamDetails]),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_exams(
    State(state): State<AppState>,
    Query(params): Query<ExamQueryParams>,
) -> Result<Json<Vec<ExamDetails>>, AppError> {
    let exam_type = params
        .exam_type
        .as_deref()
        .map(ExamType::parse)
        .transpose()?;

    let exams = ExamService::list_exams(&state.db, params.from, params.to, exam_type).await?;
    Ok(Json(exams))
}

#[utoipa::path(
    get,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam detail", body = ExamDetails),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamDetails>, AppError> {
    let exam = ExamService::get_exam(&state.db, id).await?;
    Ok(Json(exam))
}

#[utoipa::path(
    post,
    path = "/api/exams",
    request_body = BookExamDto,
    responses(
        (status = 201, description = "Booking created", body = ExamDetails),
        (status = 400, description = "Validation, reference or conflict error", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn create_exam(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<BookExamDto>,
) -> Result<(StatusCode, Json<ExamDetails>), AppError> {
    let exam = ExamService::book_exam(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    put,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = BookExamDto,
    responses(
        (status = 200, description = "Booking updated", body = ExamDetails),
        (status = 400, description = "Validation, reference or conflict error", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<BookExamDto>,
) -> Result<Json<ExamDetails>, AppError> {
    let exam = ExamService::update_exam(&state.db, id, dto).await?;
    Ok(Json(exam))
}

#[utoipa::path(
    delete,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Booking deleted"),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn delete_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    ExamService::delete_exam(&state.db, id).await?;
    Ok(Json(json!({"message": "Exam deleted successfully"})))
}

#[utoipa::path(
    get,
    path = "/api/examiners",
    params(ExamTypeParam),
    responses(
        (status = 200, description = "Candidate examiners for the exam type", body = [ExaminerOption])
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_examiners(
    State(state): State<AppState>,
    Query(params): Query<ExamTypeParam>,
) -> Result<Json<Vec<ExaminerOption>>, AppError> {
    let exam_type = ExamType::parse(&params.exam_type)?;
    let examiners = ExamService::list_examiners(&state.db, exam_type).await?;
    Ok(Json(examiners))
}

#[utoipa::path(
    get,
    path = "/api/exam-locations",
    params(ExamTypeParam),
    responses(
        (status = 200, description = "Candidate resources for the exam type", body = [LocationOption])
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_exam_locations(
    State(state): State<AppState>,
    Query(params): Query<ExamTypeParam>,
) -> Result<Json<Vec<LocationOption>>, AppError> {
    let exam_type = ExamType::parse(&params.exam_type)?;
    let locations = ExamService::list_locations(&state.db, exam_type).await?;
    Ok(Json(locations))
}

#[utoipa::path(
    get,
    path = "/api/examiner/exams",
    responses(
        (status = 200, description = "Exams administered by the calling examiner", body = [ExamDetails]),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "No examiner profile linked to this account", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_exams(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ExamDetails>>, AppError> {
    let user_id = auth_user.user_id()?;
    let exams = ExamService::list_exams_for_user(&state.db, user_id).await?;
    Ok(Json(exams))
}
