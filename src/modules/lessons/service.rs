use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::lessons::model::{
    CreateLessonDto, Lesson, LessonKind, LessonQueryParams, UpdateLessonDto,
};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!(
                "Unknown topic, group, teacher, classroom, student, instructor or car reference"
            ));
        }
        if db_err.is_check_violation() {
            return AppError::bad_request(anyhow!("Lesson participants do not match its kind"));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

/// Rejects payloads whose participants do not fit the lesson kind before the
/// row ever reaches the database CHECK constraint.
fn validate_shape(dto: &CreateLessonDto) -> Result<(), AppError> {
    match dto.kind {
        LessonKind::Theory => {
            if dto.group_id.is_none() || dto.teacher_id.is_none() {
                return Err(AppError::bad_request(anyhow!(
                    "Theory lessons require a group and a teacher"
                )));
            }
            if dto.student_id.is_some() || dto.instructor_id.is_some() || dto.car_id.is_some() {
                return Err(AppError::bad_request(anyhow!(
                    "Theory lessons cannot carry a student, instructor or car"
                )));
            }
        }
        LessonKind::Practice => {
            if dto.student_id.is_none() || dto.instructor_id.is_none() {
                return Err(AppError::bad_request(anyhow!(
                    "Practice lessons require a student and an instructor"
                )));
            }
            if dto.group_id.is_some() || dto.teacher_id.is_some() || dto.classroom_id.is_some() {
                return Err(AppError::bad_request(anyhow!(
                    "Practice lessons cannot carry a group, teacher or classroom"
                )));
            }
        }
    }
    Ok(())
}

pub struct LessonService;

impl LessonService {
    #[instrument(skip(db, dto))]
    pub async fn create_lesson(db: &PgPool, dto: CreateLessonDto) -> Result<Lesson, AppError> {
        if dto.end_time <= dto.start_time {
            return Err(AppError::bad_request(anyhow!(
                "Lesson must end after it starts"
            )));
        }
        validate_shape(&dto)?;

        sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (
                kind, topic_id, group_id, teacher_id, classroom_id,
                student_id, instructor_id, car_id, start_time, end_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(dto.kind.as_str())
        .bind(dto.topic_id)
        .bind(dto.group_id)
        .bind(dto.teacher_id)
        .bind(dto.classroom_id)
        .bind(dto.student_id)
        .bind(dto.instructor_id)
        .bind(dto.car_id)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(db)
        .await
        .map_err(map_write_error)
    }

    #[instrument(skip(db))]
    pub async fn get_lessons(
        db: &PgPool,
        params: LessonQueryParams,
    ) -> Result<Vec<Lesson>, AppError> {
        let kind = match params.kind.as_deref() {
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

        sqlx::query_as::<_, Lesson>(
            r#"
            SELECT * FROM lessons
            WHERE ($1::uuid IS NULL OR student_id = $1)
              AND ($2::uuid IS NULL OR group_id = $2)
              AND ($3::text IS NULL OR kind = $3)
              AND ($4::timestamptz IS NULL OR end_time > $4)
              AND ($5::timestamptz IS NULL OR start_time < $5)
            ORDER BY start_time
            "#,
        )
        .bind(params.student_id)
        .bind(params.group_id)
        .bind(kind)
        .bind(params.from)
        .bind(params.to)
        .fetch_all(db)
        .await
        .context("Failed to fetch lessons")
        .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_lesson_by_id(db: &PgPool, id: Uuid) -> Result<Lesson, AppError> {
        sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch lesson by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Lesson not found")))
    }

    /// Reschedules or retopics a lesson. Participants are fixed at creation;
    /// moving a lesson to different people means deleting and rebooking it.
    #[instrument(skip(db, dto))]
    pub async fn update_lesson(
        db: &PgPool,
        id: Uuid,
        dto: UpdateLessonDto,
    ) -> Result<Lesson, AppError> {
        let existing = Self::get_lesson_by_id(db, id).await?;

        let topic_id = dto.topic_id.unwrap_or(existing.topic_id);
        let start_time = dto.start_time.unwrap_or(existing.start_time);
        let end_time = dto.end_time.unwrap_or(existing.end_time);

        if end_time <= start_time {
            return Err(AppError::bad_request(anyhow!(
                "Lesson must end after it starts"
            )));
        }

        sqlx::query_as::<_, Lesson>(
            r#"
            UPDATE lessons
            SET topic_id = $1, start_time = $2, end_time = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(topic_id)
        .bind(start_time)
        .bind(end_time)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(map_write_error)
    }

    #[instrument(skip(db))]
    pub async fn delete_lesson(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete lesson")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Lesson not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn theory_dto() -> CreateLessonDto {
        CreateLessonDto {
            kind: LessonKind::Theory,
            topic_id: Uuid::new_v4(),
            group_id: Some(Uuid::new_v4()),
            teacher_id: Some(Uuid::new_v4()),
            classroom_id: None,
            student_id: None,
            instructor_id: None,
            car_id: None,
            start_time: Utc::now(),
            end_time: Utc::now() + chrono::Duration::hours(1),
        }
    }

    #[test]
    fn theory_shape_accepts_group_and_teacher() {
        assert!(validate_shape(&theory_dto()).is_ok());
    }

    #[test]
    fn theory_shape_rejects_missing_teacher() {
        let mut dto = theory_dto();
        dto.teacher_id = None;
        assert!(validate_shape(&dto).is_err());
    }

    #[test]
    fn theory_shape_rejects_practice_participants() {
        let mut dto = theory_dto();
        dto.car_id = Some(Uuid::new_v4());
        assert!(validate_shape(&dto).is_err());
    }

    #[test]
    fn practice_shape_requires_student_and_instructor() {
        let mut dto = theory_dto();
        dto.kind = LessonKind::Practice;
        dto.group_id = None;
        dto.teacher_id = None;
        assert!(validate_shape(&dto).is_err());

        dto.student_id = Some(Uuid::new_v4());
        dto.instructor_id = Some(Uuid::new_v4());
        assert!(validate_shape(&dto).is_ok());
    }
}
