use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::groups::model::{CreateGroupDto, Group, UpdateGroupDto};
use crate::modules::groups::service::GroupService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
#[instrument(skip(state, dto))]
pub async fn create_group(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateGroupDto>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let group = GroupService::create_group(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses((status = 200, description = "List of groups", body = [Group])),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn get_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, AppError> {
    let groups = GroupService::get_groups(&state.db).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group details", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>, AppError> {
    let group = GroupService::get_group_by_id(&state.db, id).await?;
    Ok(Json(group))
}

#[utoipa::path(
    put,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    request_body = UpdateGroupDto,
    responses(
        (status = 200, description = "Group updated", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
#[instrument(skip(state, dto))]
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGroupDto>,
) -> Result<Json<Group>, AppError> {
    let group = GroupService::update_group(&state.db, id, dto).await?;
    Ok(Json(group))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted"),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
#[instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    GroupService::delete_group(&state.db, id).await?;
    Ok(Json(json!({"message": "Group deleted successfully"})))
}
