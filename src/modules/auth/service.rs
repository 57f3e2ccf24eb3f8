use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{LoginRequest, LoginResponse, User, UserRole};
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::verify_password;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, jwt_config, dto))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user by email")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&dto.password, &user.password)? {
            return Err(AppError::unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let role = UserRole::parse(&user.role)
            .map_err(|_| AppError::internal_error(format!("Corrupt role on user {}", user.id)))?;

        let access_token = create_access_token(user.id, &user.email, role, jwt_config)?;

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            user: user.into(),
        })
    }

    /// Creates an admin login. Only reachable from the binary's `create-admin`
    /// argv path, never from the HTTP surface.
    pub async fn create_admin(
        db: &PgPool,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AppError> {
        let hashed = crate::utils::password::hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, email, password, role)
            VALUES ($1, $2, $3, $4, 'admin')
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(hashed)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request(anyhow::anyhow!(
                        "User with email {} already exists",
                        email
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(())
    }
}
