/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/v1/users.
 *
 * # Registration Process
 *
 * 1. Validate username, password, display name and public key
 * 2. Check if the username is taken
 * 3. Hash password using bcrypt
 * 4. Create user in database
 *
 * Registration does not log the user in; clients call login afterwards.
 */

use axum::extract::State;
use bcrypt::{hash, DEFAULT_COST};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{SignupRequest, UserResponse};
use crate::backend::auth::users::{create_user, get_user_by_username, NewUser};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::validation::ValidJson;
use crate::shared::ApiResponse;

/// Sign up handler
///
/// # Arguments
///
/// * `State(pool)` - Database connection pool
/// * `ValidJson(request)` - Registration fields
///
/// # Returns
///
/// The created user, without the password hash
///
/// # Errors
///
/// * `400` - If a field is out of bounds or the username is taken
/// * `500` - If hashing or the insert fails
pub async fn signup(
    State(pool): State<SqlitePool>,
    ValidJson(request): ValidJson<SignupRequest>,
) -> BackendResult<ApiResponse<UserResponse>> {
    request.validate()?;
    let username = request.username.trim().to_string();
    tracing::info!("[Auth] Signup request for username: {}", username);

    if get_user_by_username(&pool, &username).await?.is_some() {
        tracing::warn!("[Auth] Username already exists: {}", username);
        return Err(BackendError::validation("The username has existed"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)?;

    let user = create_user(
        &pool,
        NewUser {
            username,
            password_hash,
            display_name: request.display_name.trim().to_string(),
            pub_key: request.pub_key,
            is_admin: false,
        },
    )
    .await?;

    tracing::info!("[Auth] User created: {} ({})", user.username, user.id);
    Ok(ApiResponse::ok_with_message(
        UserResponse::from(user),
        "Create user successfully",
    ))
}
