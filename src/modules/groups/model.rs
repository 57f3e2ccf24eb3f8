use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub teacher_id: Uuid,
    pub classroom_id: Option<Uuid>,
    pub starts_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub category_id: Uuid,
    pub teacher_id: Uuid,
    pub classroom_id: Option<Uuid>,
    pub starts_on: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupDto {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub classroom_id: Option<Uuid>,
    pub starts_on: Option<NaiveDate>,
}
