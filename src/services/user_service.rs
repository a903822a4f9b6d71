use sqlx::PgPool;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::user_dto::{LoginPayload, RegisterUserPayload};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::{
    decode_token, issue_access_token, issue_refresh_token, TOKEN_TYPE_REFRESH,
};

const USER_COLUMNS: &str = "id, email, password_hash, company_id, is_superuser, is_active, \
     last_login, created_at, last_updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Unknown account and wrong password collapse into the same outcome so
/// the login surface cannot be used for user enumeration.
fn invalid_credentials() -> Error {
    Error::Unauthorized("Invalid credentials".to_string())
}

fn invalid_token() -> Error {
    Error::Unauthorized("Invalid token".to_string())
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a user, auto-associating a company whose registered domain
    /// matches the email's domain. Domains are stored lowercase, making the
    /// lookup case-insensitive.
    pub async fn register(&self, payload: RegisterUserPayload) -> Result<User> {
        let email = payload.email.trim().to_lowercase();
        let domain = email.split('@').next_back().unwrap_or_default().to_string();
        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let mut tx = self.pool.begin().await?;
        let company_id: Option<Uuid> =
            sqlx::query_scalar("SELECT company_id FROM company_domains WHERE name = $1")
                .bind(&domain)
                .fetch_optional(&mut *tx)
                .await?;

        let sql = format!(
            "INSERT INTO users (email, password_hash, company_id) VALUES ($1, $2, $3) \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&email)
            .bind(&password_hash)
            .bind(company_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => {
                    Error::Conflict("User with this email already exists".to_string())
                }
                other => other,
            })?;
        tx.commit().await?;

        Ok(user)
    }

    pub async fn authenticate(&self, payload: LoginPayload) -> Result<TokenPair> {
        let email = payload.email.trim().to_lowercase();
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !user.is_active {
            return Err(invalid_credentials());
        }
        let password_ok = verify_password(&payload.password, &user.password_hash)
            .unwrap_or(false);
        if !password_ok {
            return Err(invalid_credentials());
        }

        sqlx::query("UPDATE users SET last_login = NOW(), last_updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        let config = get_config();
        Ok(TokenPair {
            access_token: issue_access_token(
                user.id,
                &config.jwt_secret,
                config.access_token_ttl_minutes,
            )?,
            refresh_token: issue_refresh_token(
                user.id,
                &config.jwt_secret,
                config.refresh_token_ttl_days,
            )?,
        })
    }

    /// Issues a fresh access token for a valid refresh token. The refresh
    /// token itself is not rotated. All failure causes collapse into one
    /// generic outcome.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let config = get_config();
        let claims = decode_token(refresh_token, &config.jwt_secret).map_err(|_| invalid_token())?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(invalid_token());
        }

        let is_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
                .bind(claims.sub)
                .fetch_optional(&self.pool)
                .await?;
        if is_active != Some(true) {
            return Err(invalid_token());
        }

        issue_access_token(claims.sub, &config.jwt_secret, config.access_token_ttl_minutes)
    }
}
