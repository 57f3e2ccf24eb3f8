use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::instrument;

use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;

/// Second-resolution cron, 07:00 UTC unless REMINDER_CRON overrides it.
const DEFAULT_CRON: &str = "0 0 7 * * *";

#[derive(Debug, FromRow)]
struct LessonReminderRow {
    email: String,
    first_name: String,
    topic: String,
    kind: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ExamReminderRow {
    email: String,
    first_name: String,
    exam_type: String,
    location: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

/// Registers the daily reminder job and hands the scheduler back so it keeps
/// ticking for the lifetime of the process.
pub async fn start_scheduler(state: AppState) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| AppError::internal_error(format!("Failed to create scheduler: {}", e)))?;

    let cron = std::env::var("REMINDER_CRON").unwrap_or_else(|_| DEFAULT_CRON.to_string());

    let job_state = state.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = job_state.clone();
        Box::pin(async move {
            if let Err(e) = send_daily_reminders(&state).await {
                tracing::error!("Error sending daily reminders: {}", e);
            }
        })
    })
    .map_err(|e| AppError::internal_error(format!("Invalid reminder cron '{}': {}", cron, e)))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| AppError::internal_error(format!("Failed to add reminder job: {}", e)))?;
    scheduler
        .start()
        .await
        .map_err(|e| AppError::internal_error(format!("Failed to start scheduler: {}", e)))?;

    tracing::info!(cron = %cron, "Reminder scheduler started");

    Ok(scheduler)
}

/// One pass of the daily digest: lessons in the next 24 hours go to the
/// students taking them, exams to the examiners administering them. A failed
/// send is logged and skipped so one bad address cannot starve the rest.
#[instrument(skip(state))]
pub async fn send_daily_reminders(state: &AppState) -> Result<(), AppError> {
    let mailer = EmailService::new(state.email_config.clone());
    let now = Utc::now();
    let until = now + Duration::hours(24);

    let lesson_digests = collect_lesson_digests(&state.db, now, until).await?;
    let exam_digests = collect_exam_digests(&state.db, now, until).await?;
    tracing::info!(
        students = lesson_digests.len(),
        examiners = exam_digests.len(),
        "Sending daily reminder digests"
    );

    for (email, (name, lines)) in &lesson_digests {
        if let Err(e) = mailer.send_lesson_digest(email, name, lines).await {
            tracing::warn!(to = %email, "Failed to send lesson digest: {}", e);
        }
    }

    for (email, (name, lines)) in &exam_digests {
        if let Err(e) = mailer.send_exam_digest(email, name, lines).await {
            tracing::warn!(to = %email, "Failed to send exam digest: {}", e);
        }
    }

    Ok(())
}

async fn collect_lesson_digests(
    db: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<BTreeMap<String, (String, Vec<String>)>, AppError> {
    let rows = sqlx::query_as::<_, LessonReminderRow>(
        r#"
        SELECT s.email, s.first_name, t.title AS topic, l.kind, l.start_time, l.end_time
        FROM lessons l
        JOIN lesson_topics t ON t.id = l.topic_id
        JOIN students s
          ON s.id = l.student_id
          OR (l.group_id IS NOT NULL AND s.group_id = l.group_id)
        WHERE l.start_time >= $1 AND l.start_time < $2
        ORDER BY s.email, l.start_time
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
    .map_err(AppError::database)?;

    let mut digests: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();
    for row in rows {
        let line = format!(
            "{} ({}) from {} to {}",
            row.topic,
            row.kind,
            row.start_time.format("%Y-%m-%d %H:%M"),
            row.end_time.format("%H:%M")
        );
        digests
            .entry(row.email)
            .or_insert_with(|| (row.first_name, Vec::new()))
            .1
            .push(line);
    }

    Ok(digests)
}

async fn collect_exam_digests(
    db: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<BTreeMap<String, (String, Vec<String>)>, AppError> {
    let rows = sqlx::query_as::<_, ExamReminderRow>(
        r#"
        SELECT COALESCE(t.email, i.email) AS email,
               COALESCE(t.first_name, i.first_name) AS first_name,
               e.exam_type,
               COALESCE(cl.name, c.make || ' ' || c.model || ' (' || c.registration || ')')
                   AS location,
               e.start_time, e.end_time
        FROM exams e
        LEFT JOIN teachers t ON t.id = e.teacher_id
        LEFT JOIN instructors i ON i.id = e.instructor_id
        JOIN exam_locations el ON el.id = e.exam_location_id
        LEFT JOIN classrooms cl ON cl.id = el.classroom_id
        LEFT JOIN cars c ON c.id = el.car_id
        WHERE e.start_time >= $1 AND e.start_time < $2
        ORDER BY email, e.start_time
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
    .map_err(AppError::database)?;

    let mut digests: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();
    for row in rows {
        let line = format!(
            "{} exam at {} from {} to {}",
            row.exam_type,
            row.location,
            row.start_time.format("%Y-%m-%d %H:%M"),
            row.end_time.format("%H:%M")
        );
        digests
            .entry(row.email)
            .or_insert_with(|| (row.first_name, Vec::new()))
            .1
            .push(line);
    }

    Ok(digests)
}
