use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::teachers::model::{CreateTeacherDto, Teacher, UpdateTeacherDto};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!("Teacher with email {} already exists", email));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!("Unknown user reference"));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, dto))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            r#"
            INSERT INTO teachers (first_name, last_name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.email))
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(db: &PgPool) -> Result<Vec<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers ORDER BY last_name, first_name")
            .fetch_all(db)
            .await
            .context("Failed to fetch teachers")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_by_id(db: &PgPool, id: Uuid) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch teacher by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let existing = Self::get_teacher_by_id(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let phone = dto.phone.or(existing.phone);
        let user_id = dto.user_id.or(existing.user_id);

        sqlx::query_as::<_, Teacher>(
            r#"
            UPDATE teachers
            SET first_name = $1, last_name = $2, email = $3, phone = $4, user_id = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&phone)
        .bind(user_id)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &email))
    }

    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::bad_request(anyhow!(
                            "Teacher is still referenced by groups, lessons or exams"
                        ));
                    }
                }
                AppError::database(anyhow::Error::from(e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        Ok(())
    }
}
