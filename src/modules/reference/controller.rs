use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::reference::model::{
    Category, ExamTypeOption, LessonTopic, LessonTopicQueryParams,
};
use crate::modules::reference::service::ReferenceService;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Licence categories", body = [Category])),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = ReferenceService::get_categories(&state.db).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/lesson-topics",
    params(LessonTopicQueryParams),
    responses(
        (status = 200, description = "Lesson topics", body = [LessonTopic]),
        (status = 400, description = "Unknown kind", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
#[instrument(skip(state))]
pub async fn get_lesson_topics(
    State(state): State<AppState>,
    Query(params): Query<LessonTopicQueryParams>,
) -> Result<Json<Vec<LessonTopic>>, AppError> {
    let topics = ReferenceService::get_lesson_topics(&state.db, params.kind).await?;
    Ok(Json(topics))
}

#[utoipa::path(
    get,
    path = "/api/exam-types",
    responses((status = 200, description = "Available exam types", body = [ExamTypeOption])),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
#[instrument]
pub async fn get_exam_types() -> Json<Vec<ExamTypeOption>> {
    Json(ReferenceService::exam_types())
}
