use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Licence category a student trains for, seeded by migration.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LessonTopic {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LessonTopicQueryParams {
    /// Restrict to 'theory' or 'practice' topics.
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExamTypeOption {
    pub value: &'static str,
    pub label: &'static str,
}
