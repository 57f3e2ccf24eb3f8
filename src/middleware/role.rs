//! Role-based authorization middleware.
//!
//! Routes are gated with `axum::middleware::from_fn_with_state` closures
//! built on [`require_roles`]. An unknown or disallowed role is rejected
//! here, before any service code runs.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {:?}, but user has role: {:?}",
            allowed_roles, user_role
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admin-only routes (all CRUD and booking endpoints).
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Examiner routes: the caller-scoped "my exams" view is only meaningful for
/// instructors and teachers.
pub async fn require_examiner(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![UserRole::Instructor, UserRole::Teacher],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes any authenticated principal may call (reference data lookups).
pub async fn require_authenticated(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![UserRole::Admin, UserRole::Instructor, UserRole::Teacher],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_accepts_known_roles_only() {
        assert_eq!(UserRole::parse("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::parse("instructor").unwrap(), UserRole::Instructor);
        assert_eq!(UserRole::parse("teacher").unwrap(), UserRole::Teacher);
        assert!(UserRole::parse("student").is_err());
        assert!(UserRole::parse("").is_err());
    }

    #[test]
    fn role_round_trips_through_as_str() {
        for role in [UserRole::Admin, UserRole::Instructor, UserRole::Teacher] {
            assert_eq!(UserRole::parse(role.as_str()).unwrap(), role);
        }
    }
}
