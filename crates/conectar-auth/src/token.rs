//! HS256 JWT issuance and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (UUID string).
    pub id: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issue a signed HS256 token for `user_id`.
pub fn issue_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    issue_token_at(user_id, Utc::now().timestamp(), config)
}

fn issue_token_at(user_id: Uuid, now: i64, config: &AuthConfig) -> Result<String, AuthError> {
    let claims = Claims {
        id: user_id.to_string(),
        iat: now,
        exp: now + config.token_lifetime_secs as i64,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an HS256 token.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Verified claims with the subject already parsed.
///
/// Proof that signature and expiry were checked; no database lookup has
/// been made yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedClaims {
    pub user_id: Uuid,
    pub expires_at: i64,
}

/// Validate a bearer token and return its subject.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<ValidatedClaims, AuthError> {
    let claims = decode_token(token, config)?;
    let user_id = Uuid::parse_str(&claims.id)
        .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))?;
    Ok(ValidatedClaims {
        user_id,
        expires_at: claims.exp,
    })
}
