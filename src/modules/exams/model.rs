use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::AppError;

/// Exam kind. Theory exams are administered by teachers in classrooms,
/// practice exams by instructors in cars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Theory,
    Practice,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Theory => "theory",
            ExamType::Practice => "practice",
        }
    }

    /// Case-insensitive parse; anything other than the two known kinds is a
    /// validation error.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.to_ascii_lowercase().as_str() {
            "theory" => Ok(ExamType::Theory),
            "practice" => Ok(ExamType::Practice),
            _ => Err(AppError::bad_request(anyhow::anyhow!(
                "Unknown exam type '{}', expected 'theory' or 'practice'",
                value
            ))),
        }
    }
}

/// A booking request resolved to its concrete shape. The examiner and
/// location ids from the wire are interpreted once, here, instead of
/// re-branching on the exam type throughout the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamSlot {
    Theory { teacher_id: Uuid, classroom_id: Uuid },
    Practice { instructor_id: Uuid, car_id: Uuid },
}

impl ExamSlot {
    pub fn new(exam_type: ExamType, examiner_id: Uuid, location_id: Uuid) -> Self {
        match exam_type {
            ExamType::Theory => ExamSlot::Theory {
                teacher_id: examiner_id,
                classroom_id: location_id,
            },
            ExamType::Practice => ExamSlot::Practice {
                instructor_id: examiner_id,
                car_id: location_id,
            },
        }
    }
}

/// Half-open interval intersection: `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 AND s2 < e1`.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookExamDto {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `theory` or `practice`, case-insensitive.
    #[validate(length(min = 1, message = "type is required"))]
    #[serde(rename = "type")]
    pub exam_type: String,
    pub examiner_id: Uuid,
    pub location_id: Uuid,
}

/// Persisted exam enriched with join-derived examiner and location info.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ExamDetails {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exam_type: String,
    pub examiner_id: Uuid,
    pub examiner_name: String,
    pub examiner_role: String,
    pub exam_location_id: Uuid,
    pub location: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExamQueryParams {
    /// Only exams starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only exams starting before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Filter by exam type.
    #[serde(rename = "type")]
    pub exam_type: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExamTypeParam {
    #[serde(rename = "type")]
    pub exam_type: String,
}

/// Candidate examiner for a given exam type.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ExaminerOption {
    pub id: Uuid,
    pub name: String,
    pub role: String,
}

/// Candidate bookable resource for a given exam type.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LocationOption {
    pub id: Uuid,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (t(10, 0), t(11, 0), t(10, 30), t(11, 30)),
            (t(10, 0), t(11, 0), t(11, 0), t(12, 0)),
            (t(9, 0), t(10, 0), t(10, 30), t(11, 0)),
            (t(9, 0), t(12, 0), t(10, 0), t(11, 0)),
        ];
        for (s1, e1, s2, e2) in cases {
            assert_eq!(overlaps(s1, e1, s2, e2), overlaps(s2, e2, s1, e1));
        }
    }

    #[test]
    fn non_empty_interval_overlaps_itself() {
        assert!(overlaps(t(10, 0), t(11, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        // Half-open: [10:00, 11:00) and [11:00, 12:00) share no instant.
        assert!(!overlaps(t(10, 0), t(11, 0), t(11, 0), t(12, 0)));
        assert!(!overlaps(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn contained_interval_overlaps() {
        assert!(overlaps(t(9, 0), t(12, 0), t(10, 0), t(10, 30)));
    }

    #[test]
    fn exam_type_parse_is_case_insensitive() {
        assert_eq!(ExamType::parse("theory").unwrap(), ExamType::Theory);
        assert_eq!(ExamType::parse("THEORY").unwrap(), ExamType::Theory);
        assert_eq!(ExamType::parse("Practice").unwrap(), ExamType::Practice);
        assert!(ExamType::parse("written").is_err());
        assert!(ExamType::parse("").is_err());
    }

    #[test]
    fn slot_resolution_routes_ids_by_type() {
        let examiner = Uuid::new_v4();
        let location = Uuid::new_v4();

        match ExamSlot::new(ExamType::Theory, examiner, location) {
            ExamSlot::Theory {
                teacher_id,
                classroom_id,
            } => {
                assert_eq!(teacher_id, examiner);
                assert_eq!(classroom_id, location);
            }
            other => panic!("expected theory slot, got {:?}", other),
        }

        match ExamSlot::new(ExamType::Practice, examiner, location) {
            ExamSlot::Practice {
                instructor_id,
                car_id,
            } => {
                assert_eq!(instructor_id, examiner);
                assert_eq!(car_id, location);
            }
            other => panic!("expected practice slot, got {:?}", other),
        }
    }
}
