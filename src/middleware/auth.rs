use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::authz::{CompanyRef, Identity};
use crate::error::{Error, Result};
use crate::utils::token::{decode_token, TOKEN_TYPE_ACCESS};
use crate::AppState;

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: Uuid,
    is_superuser: bool,
    is_active: bool,
    company_id: Option<Uuid>,
    company_name: Option<String>,
}

/// Validates a bearer access token and loads the caller's account and
/// company association. Token and account failures collapse into one
/// generic outcome.
async fn resolve_identity(state: &AppState, token: &str) -> Result<Identity> {
    let config = crate::config::get_config();
    let claims = decode_token(token, &config.jwt_secret)?;
    if claims.token_type != TOKEN_TYPE_ACCESS {
        return Err(Error::Unauthorized("Invalid token".to_string()));
    }

    let row = sqlx::query_as::<_, IdentityRow>(
        r#"
        SELECT u.id, u.is_superuser, u.is_active, u.company_id, c.name AS company_name
        FROM users u
        LEFT JOIN companies c ON c.id = u.company_id
        WHERE u.id = $1
        "#,
    )
    .bind(claims.sub)
    .fetch_optional(&state.pool)
    .await?;

    let Some(row) = row else {
        return Err(Error::Unauthorized("Invalid token".to_string()));
    };
    if !row.is_active {
        return Err(Error::Unauthorized("Invalid token".to_string()));
    }

    if row.is_superuser {
        return Ok(Identity::Superuser { user_id: row.id });
    }

    let company = match (row.company_id, row.company_name) {
        (Some(id), Some(name)) => Some(CompanyRef { id, name }),
        _ => None,
    };
    Ok(Identity::Regular {
        user_id: row.id,
        company,
    })
}

fn bearer_token(req: &Request) -> Option<&str> {
    let auth_header = req.headers().get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };

    match resolve_identity(&state, token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(Error::Unauthorized(_)) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"invalid_token"})),
        )
            .into_response(),
        Err(other) => other.into_response(),
    }
}

/// Search and detail endpoints accept anonymous callers; a missing or
/// unverifiable token downgrades to `Identity::Anonymous` instead of
/// rejecting.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(&req) {
        Some(token) => resolve_identity(&state, token)
            .await
            .unwrap_or(Identity::Anonymous),
        None => Identity::Anonymous,
    };
    req.extensions_mut().insert(identity);
    next.run(req).await
}
