use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::groups::model::{CreateGroupDto, Group, UpdateGroupDto};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!("Group named {} already exists", name));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!(
                "Unknown category, teacher or classroom reference"
            ));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

pub struct GroupService;

impl GroupService {
    #[instrument(skip(db, dto))]
    pub async fn create_group(db: &PgPool, dto: CreateGroupDto) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, category_id, teacher_id, classroom_id, starts_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&dto.name)
        .bind(dto.category_id)
        .bind(dto.teacher_id)
        .bind(dto.classroom_id)
        .bind(dto.starts_on)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.name))
    }

    #[instrument(skip(db))]
    pub async fn get_groups(db: &PgPool) -> Result<Vec<Group>, AppError> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY starts_on DESC, name")
            .fetch_all(db)
            .await
            .context("Failed to fetch groups")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_group_by_id(db: &PgPool, id: Uuid) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch group by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Group not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_group(
        db: &PgPool,
        id: Uuid,
        dto: UpdateGroupDto,
    ) -> Result<Group, AppError> {
        let existing = Self::get_group_by_id(db, id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let category_id = dto.category_id.unwrap_or(existing.category_id);
        let teacher_id = dto.teacher_id.unwrap_or(existing.teacher_id);
        let classroom_id = dto.classroom_id.or(existing.classroom_id);
        let starts_on = dto.starts_on.unwrap_or(existing.starts_on);

        sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET name = $1, category_id = $2, teacher_id = $3, classroom_id = $4,
                starts_on = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(category_id)
        .bind(teacher_id)
        .bind(classroom_id)
        .bind(starts_on)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &name))
    }

    #[instrument(skip(db))]
    pub async fn delete_group(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        // Students in the group are detached, not deleted; their lessons cascade.
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete group")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Group not found")));
        }

        Ok(())
    }
}
