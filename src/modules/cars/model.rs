use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Car {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub registration: String,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCarDto {
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "Registration is required"))]
    pub registration: String,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCarDto {
    #[validate(length(min = 1, message = "Make cannot be empty"))]
    pub make: Option<String>,
    #[validate(length(min = 1, message = "Model cannot be empty"))]
    pub model: Option<String>,
    #[validate(length(min = 1, message = "Registration cannot be empty"))]
    pub registration: Option<String>,
    pub category_id: Option<Uuid>,
}
