//! Exam booking and conflict resolution.
//!
//! A booking runs as one transaction: examiner and resource validation,
//! exam-location resolution, both overlap checks and the final write either
//! all commit or all roll back (dropping the transaction on an early `?`
//! return rolls it back). The database carries matching exclusion
//! constraints, so two concurrent bookings that both pass the application
//! checks cannot both commit; the loser surfaces as a 23P01 which is mapped
//! back to the same conflict error the checks produce.
//!
//! Exam locations are memoized by value: one row per classroom or car,
//! created lazily on first use and reused forever after. A booking that
//! fails after creating the location row may leave it behind; that is
//! intentional, the row is valid for any future booking of the resource.

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::exams::model::{
    BookExamDto, ExamDetails, ExamSlot, ExamType, ExaminerOption, LocationOption,
};
use crate::utils::errors::AppError;

const EXAMINER_CONFLICT: &str = "Examiner has a conflicting exam at this time";
const LOCATION_CONFLICT: &str = "Location is already booked at this time";

/// Shared SELECT for the enriched exam shape: examiner name/role and the
/// location description are join-derived, never stored.
const EXAM_DETAILS_SELECT: &str = r#"
    SELECT e.id, e.start_time, e.end_time, e.exam_type, e.exam_location_id,
           COALESCE(e.teacher_id, e.instructor_id) AS examiner_id,
           COALESCE(t.first_name || ' ' || t.last_name,
                    i.first_name || ' ' || i.last_name) AS examiner_name,
           CASE WHEN e.teacher_id IS NOT NULL THEN 'teacher' ELSE 'instructor' END
               AS examiner_role,
           COALESCE(cl.name,
                    c.make || ' ' || c.model || ' (' || c.registration || ')') AS location
    FROM exams e
    LEFT JOIN teachers t ON t.id = e.teacher_id
    LEFT JOIN instructors i ON i.id = e.instructor_id
    JOIN exam_locations el ON el.id = e.exam_location_id
    LEFT JOIN classrooms cl ON cl.id = el.classroom_id
    LEFT JOIN cars c ON c.id = el.car_id
"#;

pub struct ExamService;

impl ExamService {
    #[instrument(skip(db, dto))]
    pub async fn book_exam(db: &PgPool, dto: BookExamDto) -> Result<ExamDetails, AppError> {
        Self::persist(db, None, dto).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_exam(
        db: &PgPool,
        id: Uuid,
        dto: BookExamDto,
    ) -> Result<ExamDetails, AppError> {
        Self::persist(db, Some(id), dto).await
    }

    /// Creates or fully overwrites a booking. `existing_id` selects the row
    /// to update and excludes it from its own conflict checks.
    async fn persist(
        db: &PgPool,
        existing_id: Option<Uuid>,
        dto: BookExamDto,
    ) -> Result<ExamDetails, AppError> {
        let exam_type = ExamType::parse(&dto.exam_type)?;

        if dto.end_time <= dto.start_time {
            return Err(AppError::bad_request(anyhow!(
                "end_time must be after start_time"
            )));
        }

        let slot = ExamSlot::new(exam_type, dto.examiner_id, dto.location_id);

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin booking transaction")
            .map_err(AppError::database)?;

        if let Some(id) = existing_id {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM exams WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await
                    .context("Failed to look up exam")
                    .map_err(AppError::database)?;

            if !exists {
                return Err(AppError::not_found(anyhow!("Exam not found")));
            }
        }

        Self::verify_examiner(&mut tx, &slot).await?;
        Self::verify_resource(&mut tx, &slot).await?;

        let exam_location_id = Self::resolve_exam_location(&mut tx, &slot).await?;

        if Self::examiner_has_overlap(&mut tx, &slot, existing_id, dto.start_time, dto.end_time)
            .await?
        {
            return Err(AppError::conflict(EXAMINER_CONFLICT));
        }

        if Self::location_has_overlap(
            &mut tx,
            exam_location_id,
            existing_id,
            dto.start_time,
            dto.end_time,
        )
        .await?
        {
            return Err(AppError::conflict(LOCATION_CONFLICT));
        }

        let (teacher_id, instructor_id) = match slot {
            ExamSlot::Theory { teacher_id, .. } => (Some(teacher_id), None),
            ExamSlot::Practice { instructor_id, .. } => (None, Some(instructor_id)),
        };

        let exam_id = match existing_id {
            None => sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO exams
                    (start_time, end_time, exam_type, teacher_id, instructor_id, exam_location_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(exam_type.as_str())
            .bind(teacher_id)
            .bind(instructor_id)
            .bind(exam_location_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Self::map_booking_store_error)?,
            Some(id) => sqlx::query_scalar::<_, Uuid>(
                r#"
                UPDATE exams
                SET start_time = $1, end_time = $2, exam_type = $3,
                    teacher_id = $4, instructor_id = $5, exam_location_id = $6,
                    updated_at = NOW()
                WHERE id = $7
                RETURNING id
                "#,
            )
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(exam_type.as_str())
            .bind(teacher_id)
            .bind(instructor_id)
            .bind(exam_location_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                // The row can vanish between the existence check and the
                // write if a concurrent delete commits in between.
                sqlx::Error::RowNotFound => AppError::not_found(anyhow!("Exam not found")),
                e => Self::map_booking_store_error(e),
            })?,
        };

        tx.commit()
            .await
            .context("Failed to commit booking transaction")
            .map_err(AppError::database)?;

        Self::get_exam(db, exam_id).await
    }

    async fn verify_examiner(
        tx: &mut Transaction<'_, Postgres>,
        slot: &ExamSlot,
    ) -> Result<(), AppError> {
        let (sql, id, kind) = match slot {
            ExamSlot::Theory { teacher_id, .. } => (
                "SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)",
                *teacher_id,
                "teacher",
            ),
            ExamSlot::Practice { instructor_id, .. } => (
                "SELECT EXISTS(SELECT 1 FROM instructors WHERE id = $1)",
                *instructor_id,
                "instructor",
            ),
        };

        let exists = sqlx::query_scalar::<_, bool>(sql)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .context("Failed to verify examiner")
            .map_err(AppError::database)?;

        if !exists {
            return Err(AppError::bad_request(anyhow!(
                "Invalid examiner: no {} with id {}",
                kind,
                id
            )));
        }

        Ok(())
    }

    async fn verify_resource(
        tx: &mut Transaction<'_, Postgres>,
        slot: &ExamSlot,
    ) -> Result<(), AppError> {
        match slot {
            ExamSlot::Theory { classroom_id, .. } => {
                let available = sqlx::query_scalar::<_, bool>(
                    "SELECT available FROM classrooms WHERE id = $1",
                )
                .bind(classroom_id)
                .fetch_optional(&mut **tx)
                .await
                .context("Failed to verify classroom")
                .map_err(AppError::database)?;

                match available {
                    None => Err(AppError::bad_request(anyhow!(
                        "Invalid location: no classroom with id {}",
                        classroom_id
                    ))),
                    Some(false) => Err(AppError::bad_request(anyhow!(
                        "Invalid location: classroom is not available"
                    ))),
                    Some(true) => Ok(()),
                }
            }
            ExamSlot::Practice { car_id, .. } => {
                let exists =
                    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cars WHERE id = $1)")
                        .bind(car_id)
                        .fetch_one(&mut **tx)
                        .await
                        .context("Failed to verify car")
                        .map_err(AppError::database)?;

                if !exists {
                    return Err(AppError::bad_request(anyhow!(
                        "Invalid location: no car with id {}",
                        car_id
                    )));
                }
                Ok(())
            }
        }
    }

    /// Finds or creates the exam-location row for the slot's resource. The
    /// upsert targets the partial unique index on the non-null column, so
    /// concurrent bookings of the same resource converge on one row.
    async fn resolve_exam_location(
        tx: &mut Transaction<'_, Postgres>,
        slot: &ExamSlot,
    ) -> Result<Uuid, AppError> {
        let (sql, id) = match slot {
            ExamSlot::Theory { classroom_id, .. } => (
                r#"
                INSERT INTO exam_locations (classroom_id)
                VALUES ($1)
                ON CONFLICT (classroom_id) WHERE classroom_id IS NOT NULL
                DO UPDATE SET classroom_id = EXCLUDED.classroom_id
                RETURNING id
                "#,
                *classroom_id,
            ),
            ExamSlot::Practice { car_id, .. } => (
                r#"
                INSERT INTO exam_locations (car_id)
                VALUES ($1)
                ON CONFLICT (car_id) WHERE car_id IS NOT NULL
                DO UPDATE SET car_id = EXCLUDED.car_id
                RETURNING id
                "#,
                *car_id,
            ),
        };

        sqlx::query_scalar::<_, Uuid>(sql)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .context("Failed to resolve exam location")
            .map_err(AppError::database)
    }

    async fn examiner_has_overlap(
        tx: &mut Transaction<'_, Postgres>,
        slot: &ExamSlot,
        exclude: Option<Uuid>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let (sql, examiner_id) = match slot {
            ExamSlot::Theory { teacher_id, .. } => (
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM exams
                    WHERE teacher_id = $1
                      AND ($2::uuid IS NULL OR id <> $2)
                      AND start_time < $4 AND $3 < end_time
                )
                "#,
                *teacher_id,
            ),
            ExamSlot::Practice { instructor_id, .. } => (
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM exams
                    WHERE instructor_id = $1
                      AND ($2::uuid IS NULL OR id <> $2)
                      AND start_time < $4 AND $3 < end_time
                )
                "#,
                *instructor_id,
            ),
        };

        sqlx::query_scalar::<_, bool>(sql)
            .bind(examiner_id)
            .bind(exclude)
            .bind(start)
            .bind(end)
            .fetch_one(&mut **tx)
            .await
            .context("Failed to check examiner conflicts")
            .map_err(AppError::database)
    }

    async fn location_has_overlap(
        tx: &mut Transaction<'_, Postgres>,
        exam_location_id: Uuid,
        exclude: Option<Uuid>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM exams
                WHERE exam_location_id = $1
                  AND ($2::uuid IS NULL OR id <> $2)
                  AND start_time < $4 AND $3 < end_time
            )
            "#,
        )
        .bind(exam_location_id)
        .bind(exclude)
        .bind(start)
        .bind(end)
        .fetch_one(&mut **tx)
        .await
        .context("Failed to check location conflicts")
        .map_err(AppError::database)
    }

    /// Translates storage-level constraint violations raised by a concurrent
    /// writer into the same conflict errors the logical checks produce.
    fn map_booking_store_error(e: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23P01") {
                return match db_err.constraint() {
                    Some("exams_location_no_overlap") => AppError::conflict(LOCATION_CONFLICT),
                    _ => AppError::conflict(EXAMINER_CONFLICT),
                };
            }
            if db_err.is_foreign_key_violation() {
                return AppError::bad_request(anyhow!("Booking references an unknown record"));
            }
        }
        AppError::database(anyhow::Error::from(e))
    }

    #[instrument(skip(db))]
    pub async fn get_exam(db: &PgPool, id: Uuid) -> Result<ExamDetails, AppError> {
        let sql = format!("{} WHERE e.id = $1", EXAM_DETAILS_SELECT);

        sqlx::query_as::<_, ExamDetails>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch exam")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Exam not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_exams(
        db: &PgPool,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        exam_type: Option<ExamType>,
    ) -> Result<Vec<ExamDetails>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::timestamptz IS NULL OR e.start_time >= $1)
              AND ($2::timestamptz IS NULL OR e.start_time < $2)
              AND ($3::text IS NULL OR e.exam_type = $3)
            ORDER BY e.start_time
            "#,
            EXAM_DETAILS_SELECT
        );

        sqlx::query_as::<_, ExamDetails>(&sql)
            .bind(from)
            .bind(to)
            .bind(exam_type.map(|t| t.as_str()))
            .fetch_all(db)
            .await
            .context("Failed to list exams")
            .map_err(AppError::database)
    }

    /// Role-scoped view: exams administered by the examiner linked to the
    /// given login account.
    #[instrument(skip(db))]
    pub async fn list_exams_for_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ExamDetails>, AppError> {
        let linked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM teachers WHERE user_id = $1)
                OR EXISTS(SELECT 1 FROM instructors WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("Failed to resolve examiner profile")
        .map_err(AppError::database)?;

        if !linked {
            return Err(AppError::not_found(anyhow!(
                "No examiner profile is linked to this account"
            )));
        }

        let sql = format!(
            "{} WHERE t.user_id = $1 OR i.user_id = $1 ORDER BY e.start_time",
            EXAM_DETAILS_SELECT
        );

        sqlx::query_as::<_, ExamDetails>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await
            .context("Failed to list examiner exams")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn delete_exam(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        // The exam_location row is deliberately left behind; it stays valid
        // for any future booking of the same resource.
        let result = sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete exam")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Exam not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_examiners(
        db: &PgPool,
        exam_type: ExamType,
    ) -> Result<Vec<ExaminerOption>, AppError> {
        let sql = match exam_type {
            ExamType::Theory => {
                r#"
                SELECT id, first_name || ' ' || last_name AS name, 'teacher' AS role
                FROM teachers ORDER BY last_name, first_name
                "#
            }
            ExamType::Practice => {
                r#"
                SELECT id, first_name || ' ' || last_name AS name, 'instructor' AS role
                FROM instructors ORDER BY last_name, first_name
                "#
            }
        };

        sqlx::query_as::<_, ExaminerOption>(sql)
            .fetch_all(db)
            .await
            .context("Failed to list examiners")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn list_locations(
        db: &PgPool,
        exam_type: ExamType,
    ) -> Result<Vec<LocationOption>, AppError> {
        let sql = match exam_type {
            ExamType::Theory => {
                r#"
                SELECT id, name AS description
                FROM classrooms WHERE available ORDER BY name
                "#
            }
            ExamType::Practice => {
                r#"
                SELECT id, make || ' ' || model || ' (' || registration || ')' AS description
                FROM cars ORDER BY make, model
                "#
            }
        };

        sqlx::query_as::<_, LocationOption>(sql)
            .fetch_all(db)
            .await
            .context("Failed to list exam locations")
            .map_err(AppError::database)
    }
}
