/**
 * Session Management and JWT Tokens
 *
 * This module handles JWT generation and validation. Every token carries a
 * unique `jti` so it can be revoked through the token store, and a
 * `token_type` so refresh tokens cannot be used as access tokens.
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::backend::server::config::AuthConfig;

/// Access or refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token id, the revocation key
    pub jti: String,
    /// Access or refresh
    pub token_type: TokenType,
    /// Username at issue time
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// A freshly signed token and the metadata the token store records
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub token_type: TokenType,
    /// Expiration time (Unix timestamp)
    pub expires: i64,
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `config` - Secret and lifetimes
/// * `user_id` - User ID (UUID)
/// * `username` - Username, informational only
/// * `token_type` - Access or refresh
///
/// # Returns
/// The signed token with its `jti` and expiry
pub fn create_token(
    config: &AuthConfig,
    user_id: Uuid,
    username: &str,
    token_type: TokenType,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let ttl = match token_type {
        TokenType::Access => config.access_token_ttl,
        TokenType::Refresh => config.refresh_token_ttl,
    };
    let expires = now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        token_type,
        username: username.to_string(),
        exp: u64::try_from(expires).unwrap_or(0),
        iat: u64::try_from(now).unwrap_or(0),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &key)?;

    Ok(IssuedToken {
        token,
        jti: claims.jti,
        token_type,
        expires,
    })
}

/// Verify and decode a JWT token
///
/// Checks signature and expiry only; revocation is checked against the
/// token store by `tokens::authenticate_token`.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}
