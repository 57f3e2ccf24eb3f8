use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::lessons::model::LessonKind;
use crate::modules::reference::model::{Category, ExamTypeOption, LessonTopic};
use crate::utils::errors::AppError;

pub struct ReferenceService;

impl ReferenceService {
    #[instrument(skip(db))]
    pub async fn get_categories(db: &PgPool) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY code")
            .fetch_all(db)
            .await
            .context("Failed to fetch categories")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_lesson_topics(
        db: &PgPool,
        kind: Option<String>,
    ) -> Result<Vec<LessonTopic>, AppError> {
        let kind = match kind.as_deref() {
            Some(raw) => Some(
                LessonKind::parse(raw)
                    .ok_or_else(|| {
                        AppError::bad_request(anyhow!(
                            "Unknown lesson kind '{}', expected 'theory' or 'practice'",
                            raw
                        ))
                    })?
                    .as_str(),
            ),
            None => None,
        };

        sqlx::query_as::<_, LessonTopic>(
            r#"
            SELECT * FROM lesson_topics
            WHERE ($1::text IS NULL OR kind = $1)
            ORDER BY kind, title
            "#,
        )
        .bind(kind)
        .fetch_all(db)
        .await
        .context("Failed to fetch lesson topics")
        .map_err(AppError::database)
    }

    pub fn exam_types() -> Vec<ExamTypeOption> {
        vec![
            ExamTypeOption {
                value: "theory",
                label: "Theory exam",
            },
            ExamTypeOption {
                value: "practice",
                label: "Practice exam",
            },
        ]
    }
}
