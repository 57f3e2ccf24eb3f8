use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::auth::model::{Claims, UserRole};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the Bearer token and exposes the verified
/// principal. Every service call downstream assumes an already-authorized
/// caller; this is where that guarantee is established.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    pub fn role(&self) -> Result<UserRole, AppError> {
        UserRole::parse(&self.0.role)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: &str) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn role_parses_from_claims() {
        assert_eq!(AuthUser(claims("admin")).role().unwrap(), UserRole::Admin);
        assert_eq!(
            AuthUser(claims("instructor")).role().unwrap(),
            UserRole::Instructor
        );
        assert_eq!(
            AuthUser(claims("teacher")).role().unwrap(),
            UserRole::Teacher
        );
        assert!(AuthUser(claims("superuser")).role().is_err());
    }

    #[test]
    fn user_id_requires_valid_uuid() {
        let mut c = claims("admin");
        c.sub = "not-a-uuid".to_string();
        assert!(AuthUser(c).user_id().is_err());

        let id = Uuid::new_v4();
        let mut c = claims("admin");
        c.sub = id.to_string();
        assert_eq!(AuthUser(c).user_id().unwrap(), id);
    }
}
