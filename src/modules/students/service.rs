use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::utils::errors::AppError;

fn map_write_error(e: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!("Student with email {} already exists", email));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!(
                "Unknown category, group or instructor reference"
            ));
        }
    }
    AppError::database(anyhow::Error::from(e))
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, dto))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students
                (first_name, last_name, email, phone, birth_date, category_id, group_id, instructor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(dto.birth_date)
        .bind(dto.category_id)
        .bind(dto.group_id)
        .bind(dto.instructor_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.email))?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        group_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE ($1::uuid IS NULL OR group_id = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY last_name, first_name
            "#,
        )
        .bind(group_id)
        .bind(category_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch students")
        .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_id(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        Ok(student)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student_by_id(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let phone = dto.phone.or(existing.phone);
        let birth_date = dto.birth_date.unwrap_or(existing.birth_date);
        let category_id = dto.category_id.unwrap_or(existing.category_id);
        let group_id = dto.group_id.or(existing.group_id);
        let instructor_id = dto.instructor_id.or(existing.instructor_id);

        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET first_name = $1, last_name = $2, email = $3, phone = $4, birth_date = $5,
                category_id = $6, group_id = $7, instructor_id = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&phone)
        .bind(birth_date)
        .bind(category_id)
        .bind(group_id)
        .bind(instructor_id)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &email))?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        Ok(())
    }
}
