use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::utils::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
    Pdf,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Result<ReportFormat, AppError> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "pdf" => Ok(ReportFormat::Pdf),
            other => Err(AppError::bad_request(anyhow!(
                "Unknown report format '{}', expected 'json', 'csv' or 'pdf'",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQueryParams {
    /// One of 'json', 'csv' or 'pdf'. Defaults to JSON.
    pub format: Option<String>,
}

/// Flattened student row with its joined display names.
#[derive(Debug, FromRow)]
pub struct StudentReportRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub category_code: String,
    pub category_description: String,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub instructor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReportLesson {
    pub kind: String,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentReport {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub category: String,
    pub group: Option<String>,
    pub instructor: Option<String>,
    pub lessons: Vec<ReportLesson>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert!(matches!(ReportFormat::parse("PDF"), Ok(ReportFormat::Pdf)));
        assert!(matches!(ReportFormat::parse("csv"), Ok(ReportFormat::Csv)));
        assert!(matches!(
            ReportFormat::parse("Json"),
            Ok(ReportFormat::Json)
        ));
        assert!(ReportFormat::parse("xlsx").is_err());
    }
}
