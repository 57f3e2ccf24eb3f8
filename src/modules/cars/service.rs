use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::cars::model::{Car, CreateCarDto, UpdateCarDto};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error, registration: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!(
                "Car with registration {} already exists",
                registration
            ));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!("Unknown category reference"));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

pub struct CarService;

impl CarService {
    #[instrument(skip(db, dto))]
    pub async fn create_car(db: &PgPool, dto: CreateCarDto) -> Result<Car, AppError> {
        sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (make, model, registration, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&dto.make)
        .bind(&dto.model)
        .bind(&dto.registration)
        .bind(dto.category_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.registration))
    }

    #[instrument(skip(db))]
    pub async fn get_cars(db: &PgPool) -> Result<Vec<Car>, AppError> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars ORDER BY make, model")
            .fetch_all(db)
            .await
            .context("Failed to fetch cars")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_car_by_id(db: &PgPool, id: Uuid) -> Result<Car, AppError> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch car by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Car not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_car(db: &PgPool, id: Uuid, dto: UpdateCarDto) -> Result<Car, AppError> {
        let existing = Self::get_car_by_id(db, id).await?;

        let make = dto.make.unwrap_or(existing.make);
        let model = dto.model.unwrap_or(existing.model);
        let registration = dto.registration.unwrap_or(existing.registration);
        let category_id = dto.category_id.unwrap_or(existing.category_id);

        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET make = $1, model = $2, registration = $3, category_id = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&make)
        .bind(&model)
        .bind(&registration)
        .bind(category_id)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &registration))
    }

    #[instrument(skip(db))]
    pub async fn delete_car(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::bad_request(anyhow!(
                            "Car is still referenced by lessons, exams or instructors"
                        ));
                    }
                }
                AppError::database(anyhow::Error::from(e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Car not found")));
        }

        Ok(())
    }
}
