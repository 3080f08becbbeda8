/**
 * Authentication Extractor
 *
 * Routes that require a logged-in user take `AuthUser` as a parameter.
 * The extractor reads `Authorization: Bearer <token>`, resolves it through
 * the token store and rejects with an `AuthError` envelope otherwise.
 */

use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use uuid::Uuid;

use crate::backend::auth::sessions::TokenType;
use crate::backend::auth::tokens::authenticate_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data resolved from an access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    /// Id of the token that authenticated this request
    pub jti: String,
}

impl AuthenticatedUser {
    /// Admins pass every ownership check
    pub fn is_self_or_admin(&self, user_id: Uuid) -> bool {
        self.is_admin || self.user_id == user_id
    }
}

/// Extract the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BackendError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BackendError::auth("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| BackendError::auth("Invalid Authorization header format"))
}

/// Axum extractor for an authenticated user (access token)
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user =
            authenticate_token(&state.db_pool, &state.config.auth, token, TokenType::Access)
                .await?;
        Ok(AuthUser(user))
    }
}
