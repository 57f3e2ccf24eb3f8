use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::instructors::model::{CreateInstructorDto, Instructor, UpdateInstructorDto};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!(
                "Instructor with email {} already exists",
                email
            ));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!("Unknown car or user reference"));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

pub struct InstructorService;

impl InstructorService {
    #[instrument(skip(db, dto))]
    pub async fn create_instructor(
        db: &PgPool,
        dto: CreateInstructorDto,
    ) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>(
            r#"
            INSERT INTO instructors (first_name, last_name, email, phone, car_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(dto.car_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.email))
    }

    #[instrument(skip(db))]
    pub async fn get_instructors(db: &PgPool) -> Result<Vec<Instructor>, AppError> {
        sqlx::query_as::<_, Instructor>("SELECT * FROM instructors ORDER BY last_name, first_name")
            .fetch_all(db)
            .await
            .context("Failed to fetch instructors")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_instructor_by_id(db: &PgPool, id: Uuid) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>("SELECT * FROM instructors WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch instructor by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Instructor not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_instructor(
        db: &PgPool,
        id: Uuid,
        dto: UpdateInstructorDto,
    ) -> Result<Instructor, AppError> {
        let existing = Self::get_instructor_by_id(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let phone = dto.phone.or(existing.phone);
        let car_id = dto.car_id.or(existing.car_id);
        let user_id = dto.user_id.or(existing.user_id);

        sqlx::query_as::<_, Instructor>(
            r#"
            UPDATE instructors
            SET first_name = $1, last_name = $2, email = $3, phone = $4, car_id = $5,
                user_id = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&phone)
        .bind(car_id)
        .bind(user_id)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &email))
    }

    #[instrument(skip(db))]
    pub async fn delete_instructor(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM instructors WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::bad_request(anyhow!(
                            "Instructor is still referenced by lessons or exams"
                        ));
                    }
                }
                AppError::database(anyhow::Error::from(e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Instructor not found")));
        }

        Ok(())
    }
}
