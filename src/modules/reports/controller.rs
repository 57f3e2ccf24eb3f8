use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::reports::model::{ReportFormat, ReportQueryParams, StudentReport};
use crate::modules::reports::service::ReportService;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[utoipa::path(
    get,
    path = "/api/students/{id}/report",
    params(
        ("id" = Uuid, Path, description = "Student ID"),
        ReportQueryParams
    ),
    responses(
        (status = 200, description = "Student training record", body = StudentReport),
        (status = 400, description = "Unknown format", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
#[instrument(skip(state))]
pub async fn get_student_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Response, AppError> {
    let format = match params.format.as_deref() {
        Some(raw) => ReportFormat::parse(raw)?,
        None => ReportFormat::Json,
    };

    let report = ReportService::build_student_report(&state.db, id).await?;

    match format {
        ReportFormat::Json => Ok(Json(report).into_response()),
        ReportFormat::Csv => {
            let body = ReportService::render_csv(&report)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"student-report-{}.csv\"", id),
                    ),
                ],
                body,
            )
                .into_response())
        }
        ReportFormat::Pdf => {
            let body = ReportService::render_pdf(&report)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"student-report-{}.pdf\"", id),
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}
