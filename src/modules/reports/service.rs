use anyhow::{Context, anyhow};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::reports::model::{ReportLesson, StudentReport, StudentReportRow};
use crate::utils::errors::AppError;

pub struct ReportService;

impl ReportService {
    /// Assembles the full training record for one student: profile, licence
    /// category, group, assigned instructor, and every theory lesson of their
    /// group plus their own practice lessons.
    #[instrument(skip(db))]
    pub async fn build_student_report(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<StudentReport, AppError> {
        let row = sqlx::query_as::<_, StudentReportRow>(
            r#"
            SELECT s.id, s.first_name, s.last_name, s.email, s.phone, s.birth_date,
                   c.code AS category_code, c.description AS category_description,
                   s.group_id, g.name AS group_name,
                   i.first_name || ' ' || i.last_name AS instructor_name
            FROM students s
            JOIN categories c ON c.id = s.category_id
            LEFT JOIN groups g ON g.id = s.group_id
            LEFT JOIN instructors i ON i.id = s.instructor_id
            WHERE s.id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch student for report")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let lessons = sqlx::query_as::<_, ReportLesson>(
            r#"
            SELECT l.kind, t.title AS topic, l.start_time, l.end_time
            FROM lessons l
            JOIN lesson_topics t ON t.id = l.topic_id
            WHERE l.student_id = $1
               OR ($2::uuid IS NOT NULL AND l.group_id = $2)
            ORDER BY l.start_time
            "#,
        )
        .bind(student_id)
        .bind(row.group_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch lesson history for report")
        .map_err(AppError::database)?;

        Ok(StudentReport {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            birth_date: row.birth_date,
            category: format!("{} ({})", row.category_code, row.category_description),
            group: row.group_name,
            instructor: row.instructor_name,
            lessons,
            generated_at: chrono::Utc::now(),
        })
    }

    pub fn render_csv(report: &StudentReport) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        let profile = [
            (
                "student",
                format!("{} {}", report.first_name, report.last_name),
            ),
            ("email", report.email.clone()),
            ("phone", report.phone.clone().unwrap_or_default()),
            ("birth_date", report.birth_date.to_string()),
            ("category", report.category.clone()),
            ("group", report.group.clone().unwrap_or_default()),
            ("instructor", report.instructor.clone().unwrap_or_default()),
        ];
        for (key, value) in profile {
            writer.write_record([key.to_string(), value])?;
        }
        writer.write_record([String::new()])?;

        writer.write_record(["kind", "topic", "start_time", "end_time"])?;
        for lesson in &report.lessons {
            writer.write_record([
                lesson.kind.clone(),
                lesson.topic.clone(),
                lesson.start_time.to_rfc3339(),
                lesson.end_time.to_rfc3339(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::internal(anyhow!("Failed to finalize CSV report: {}", e)))
    }

    pub fn render_pdf(report: &StudentReport) -> Result<Vec<u8>, AppError> {
        let (doc, page, layer) =
            PdfDocument::new("Student report", Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::internal(anyhow!("Failed to load PDF font: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::internal(anyhow!("Failed to load PDF font: {}", e)))?;

        let layer = doc.get_page(page).get_layer(layer);
        let mut y = 280.0;

        layer.use_text(
            format!("Student report: {} {}", report.first_name, report.last_name),
            16.0,
            Mm(15.0),
            Mm(y),
            &bold,
        );
        y -= 12.0;

        let header_lines = [
            format!("Email: {}", report.email),
            format!("Phone: {}", report.phone.as_deref().unwrap_or("-")),
            format!("Birth date: {}", report.birth_date),
            format!("Category: {}", report.category),
            format!("Group: {}", report.group.as_deref().unwrap_or("-")),
            format!("Instructor: {}", report.instructor.as_deref().unwrap_or("-")),
            format!(
                "Generated: {}",
                report.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
        ];
        for line in header_lines {
            layer.use_text(line, 10.0, Mm(15.0), Mm(y), &font);
            y -= 6.0;
        }
        y -= 6.0;

        layer.use_text("Lesson history", 12.0, Mm(15.0), Mm(y), &bold);
        y -= 8.0;

        if report.lessons.is_empty() {
            layer.use_text("No lessons recorded.", 10.0, Mm(15.0), Mm(y), &font);
        }
        for lesson in &report.lessons {
            // One page is plenty for a training record; overflow just clips.
            if y < 15.0 {
                break;
            }
            layer.use_text(
                format!(
                    "{}  [{}]  {} - {}",
                    lesson.topic,
                    lesson.kind,
                    lesson.start_time.format("%Y-%m-%d %H:%M"),
                    lesson.end_time.format("%H:%M")
                ),
                10.0,
                Mm(15.0),
                Mm(y),
                &font,
            );
            y -= 6.0;
        }

        doc.save_to_bytes()
            .map_err(|e| AppError::internal(anyhow!("Failed to render PDF report: {}", e)))
    }
}
