use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::classrooms::model::{Classroom, CreateClassroomDto, UpdateClassroomDto};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!("Classroom named {} already exists", name));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(db, dto))]
    pub async fn create_classroom(
        db: &PgPool,
        dto: CreateClassroomDto,
    ) -> Result<Classroom, AppError> {
        sqlx::query_as::<_, Classroom>(
            r#"
            INSERT INTO classrooms (name, capacity, available)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&dto.name)
        .bind(dto.capacity)
        .bind(dto.available.unwrap_or(true))
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.name))
    }

    #[instrument(skip(db))]
    pub async fn get_classrooms(db: &PgPool) -> Result<Vec<Classroom>, AppError> {
        sqlx::query_as::<_, Classroom>("SELECT * FROM classrooms ORDER BY name")
            .fetch_all(db)
            .await
            .context("Failed to fetch classrooms")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_classroom_by_id(db: &PgPool, id: Uuid) -> Result<Classroom, AppError> {
        sqlx::query_as::<_, Classroom>("SELECT * FROM classrooms WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch classroom by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_classroom(
        db: &PgPool,
        id: Uuid,
        dto: UpdateClassroomDto,
    ) -> Result<Classroom, AppError> {
        let existing = Self::get_classroom_by_id(db, id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let capacity = dto.capacity.unwrap_or(existing.capacity);
        let available = dto.available.unwrap_or(existing.available);

        sqlx::query_as::<_, Classroom>(
            r#"
            UPDATE classrooms
            SET name = $1, capacity = $2, available = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(capacity)
        .bind(available)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &name))
    }

    #[instrument(skip(db))]
    pub async fn delete_classroom(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classrooms WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::bad_request(anyhow!(
                            "Classroom is still referenced by groups, lessons or exams"
                        ));
                    }
                }
                AppError::database(anyhow::Error::from(e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Classroom not found")));
        }

        Ok(())
    }
}
