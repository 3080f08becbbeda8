/**
 * Refresh Handler
 *
 * POST /api/v1/auth/refresh with `Authorization: Bearer <refresh token>`.
 * Issues and records a new access token. The refresh token stays valid.
 */

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::RefreshResponse;
use crate::backend::auth::sessions::TokenType;
use crate::backend::auth::tokens::{authenticate_token, issue_token};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::bearer_token;
use crate::backend::server::config::ServerConfig;
use crate::shared::ApiResponse;

/// Refresh handler
///
/// # Errors
///
/// * `401` - If the bearer token is not a live refresh token
pub async fn refresh(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    headers: HeaderMap,
) -> BackendResult<ApiResponse<RefreshResponse>> {
    let token = bearer_token(&headers)?;
    let caller = authenticate_token(&pool, &config.auth, token, TokenType::Refresh).await?;

    let user = get_user_by_id(&pool, caller.user_id)
        .await?
        .ok_or_else(|| BackendError::auth("User is inactive or does not exist"))?;
    let access = issue_token(&pool, &config.auth, &user, TokenType::Access).await?;

    tracing::debug!("[Auth] Refreshed access token for {}", user.id);
    Ok(ApiResponse::ok(RefreshResponse {
        access_token: access.token,
    }))
}
