use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::utils::errors::AppError;

/// JSON extractor that runs `validator::Validate` on the decoded body.
/// Deserialization failures become 400s with a message the caller can act
/// on; validation failures become 422s listing every violated rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_rejection)?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!("{}", format_errors(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

fn map_rejection(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Missing 'Content-Type: application/json' header".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::JsonDataError(err) => match missing_field(&err.body_text()) {
            Some(field) => format!("{} is required", field),
            None => "Invalid field type in request".to_string(),
        },
        _ => "Invalid request body".to_string(),
    };

    AppError::new(StatusCode::BAD_REQUEST, anyhow!(message))
}

/// serde reports an absent required field as ``missing field `name` ``; the
/// field name is only available through the rendered message.
fn missing_field(detail: &str) -> Option<&str> {
    detail.split("missing field `").nth(1)?.split('`').next()
}

fn format_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().filter_map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .or_else(|| Some(format!("{} is invalid", field)))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_extracted_from_serde_detail() {
        let detail =
            "Failed to deserialize the JSON body into the target type: missing field `password` at line 1 column 25";
        assert_eq!(missing_field(detail), Some("password"));
    }

    #[test]
    fn other_data_errors_yield_no_field() {
        let detail = "invalid type: string \"x\", expected i32 at line 1 column 10";
        assert_eq!(missing_field(detail), None);
        assert_eq!(missing_field(""), None);
    }
}
