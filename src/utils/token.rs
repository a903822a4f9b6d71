use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub token_type: String,
    /// Unique per issuance, so two tokens for the same subject and expiry
    /// never compare equal.
    pub jti: Uuid,
}

pub fn issue_access_token(user_id: Uuid, secret: &str, ttl_minutes: i64) -> Result<String> {
    issue_token(user_id, secret, Duration::minutes(ttl_minutes), TOKEN_TYPE_ACCESS)
}

pub fn issue_refresh_token(user_id: Uuid, secret: &str, ttl_days: i64) -> Result<String> {
    issue_token(user_id, secret, Duration::days(ttl_days), TOKEN_TYPE_REFRESH)
}

fn issue_token(user_id: Uuid, secret: &str, ttl: Duration, token_type: &str) -> Result<String> {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + ttl).timestamp() as usize,
        token_type: token_type.to_string(),
        jti: Uuid::new_v4(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

/// Decodes and verifies signature and expiry. Callers must still check
/// `token_type` for the surface they guard.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key";

    #[test]
    fn access_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, SECRET, 15).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn refresh_token_carries_its_type() {
        let token = issue_refresh_token(Uuid::new_v4(), SECRET, 7).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.token_type, TOKEN_TYPE_REFRESH);
    }

    #[test]
    fn repeated_issuance_yields_distinct_tokens() {
        let user_id = Uuid::new_v4();
        let first = issue_access_token(user_id, SECRET, 15).unwrap();
        let second = issue_access_token(user_id, SECRET, 15).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, 15).unwrap();
        assert!(decode_token(&token, "other_secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(
            Uuid::new_v4(),
            SECRET,
            Duration::minutes(-5),
            TOKEN_TYPE_ACCESS,
        )
        .unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_token("not-a-jwt", SECRET).is_err());
    }
}
