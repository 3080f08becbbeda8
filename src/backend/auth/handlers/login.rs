/**
 * Login Handler
 *
 * POST /api/v1/auth/login. Verifies the bcrypt hash and issues an access
 * and a refresh token, both recorded in the token store.
 *
 * Unknown usernames, wrong passwords and deactivated accounts all produce
 * the same error message.
 */

use std::sync::Arc;

use axum::extract::State;
use bcrypt::verify;
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::TokenType;
use crate::backend::auth::tokens::issue_token;
use crate::backend::auth::users::get_user_by_username;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::config::ServerConfig;
use crate::backend::validation::ValidJson;
use crate::shared::ApiResponse;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login handler
///
/// # Arguments
///
/// * `State(pool)` - Database connection pool
/// * `State(config)` - Token secret and lifetimes
/// * `ValidJson(request)` - Username and password
///
/// # Returns
///
/// Access and refresh tokens plus basic user info
///
/// # Errors
///
/// * `401` - If the user is unknown, inactive or the password is wrong
/// * `500` - If verification or token generation fails
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> BackendResult<ApiResponse<AuthResponse>> {
    let username = request.username.trim();
    tracing::info!("[Auth] Login request for: {}", username);

    let user = get_user_by_username(&pool, username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            tracing::warn!("[Auth] User not found or inactive: {}", username);
            BackendError::auth(INVALID_CREDENTIALS)
        })?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("[Auth] Invalid password for user: {}", username);
        return Err(BackendError::auth(INVALID_CREDENTIALS));
    }

    let access = issue_token(&pool, &config.auth, &user, TokenType::Access).await?;
    let refresh = issue_token(&pool, &config.auth, &user, TokenType::Refresh).await?;

    tracing::info!("[Auth] User logged in: {} ({})", user.username, user.id);
    Ok(ApiResponse::ok_with_message(
        AuthResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            user_id: user.id,
            username: user.username,
            display_name: user.display_name,
        },
        "Logged in successfully",
    ))
}
