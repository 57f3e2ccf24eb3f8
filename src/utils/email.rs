use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Sends the daily digest of upcoming lessons to a student.
    #[instrument(skip(self, lines))]
    pub async fn send_lesson_digest(
        &self,
        to_email: &str,
        to_name: &str,
        lines: &[String],
    ) -> Result<(), AppError> {
        let html_body = self.digest_template(to_name, "Your upcoming lessons", lines);
        let text_body = format!(
            "Hi {},\n\n\
             Here are your upcoming driving lessons:\n\n\
             {}\n\n\
             See you there!\n\
             DriveDesk",
            to_name,
            lines.join("\n")
        );

        self.send_email(to_email, "Upcoming lessons reminder", &text_body, &html_body)
            .await
    }

    /// Sends the daily digest of upcoming exams to an examiner.
    #[instrument(skip(self, lines))]
    pub async fn send_exam_digest(
        &self,
        to_email: &str,
        to_name: &str,
        lines: &[String],
    ) -> Result<(), AppError> {
        let html_body = self.digest_template(to_name, "Exams you administer", lines);
        let text_body = format!(
            "Hi {},\n\n\
             You have the following exams scheduled:\n\n\
             {}\n\n\
             DriveDesk",
            to_name,
            lines.join("\n")
        );

        self.send_email(to_email, "Upcoming exams reminder", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::debug!(to = to_email, subject, "SMTP disabled, skipping email");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn digest_template(&self, name: &str, heading: &str, lines: &[String]) -> String {
        let items: String = lines
            .iter()
            .map(|line| {
                format!(
                    r#"<li style="margin: 0 0 8px 0; color: #444444; font-size: 15px;">{}</li>"#,
                    line
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{heading}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #1D4ED8; padding: 24px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 26px;">DriveDesk</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 32px 28px;">
                            <h2 style="margin: 0 0 16px 0; color: #333333; font-size: 22px;">{heading}</h2>
                            <p style="margin: 0 0 16px 0; color: #666666; font-size: 16px;">
                                Hi <strong>{name}</strong>,
                            </p>
                            <ul style="margin: 0 0 16px 0; padding-left: 20px;">{items}</ul>
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 16px 28px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated reminder from DriveDesk. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
        )
    }
}
