use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Theory lessons are taught to a group by a teacher; practice lessons are
/// one-on-one drives between a student and an instructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Theory,
    Practice,
}

impl LessonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonKind::Theory => "theory",
            LessonKind::Practice => "practice",
        }
    }

    pub fn parse(value: &str) -> Option<LessonKind> {
        match value.to_ascii_lowercase().as_str() {
            "theory" => Some(LessonKind::Theory),
            "practice" => Some(LessonKind::Practice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Lesson {
    pub id: Uuid,
    pub kind: String,
    pub topic_id: Uuid,
    pub group_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub classroom_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLessonDto {
    pub kind: LessonKind,
    pub topic_id: Uuid,
    pub group_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub classroom_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLessonDto {
    pub topic_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LessonQueryParams {
    pub student_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub kind: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_kind_parses_case_insensitively() {
        assert_eq!(LessonKind::parse("Theory"), Some(LessonKind::Theory));
        assert_eq!(LessonKind::parse("PRACTICE"), Some(LessonKind::Practice));
        assert_eq!(LessonKind::parse("driving"), None);
    }

    #[test]
    fn lesson_kind_round_trips_as_str() {
        for kind in [LessonKind::Theory, LessonKind::Practice] {
            assert_eq!(LessonKind::parse(kind.as_str()), Some(kind));
        }
    }
}
