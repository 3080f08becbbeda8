/**
 * Account Handlers
 *
 * Self-service profile and password changes, plus the admin counterparts.
 *
 * # Credential changes
 *
 * A password change keeps the token used for the call and revokes every
 * other token of the user. An admin reset revokes them all. In both cases
 * the socket sessions opened with a revoked token are closed.
 */

use axum::extract::{Path, State};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{
    AdminUpdateUserRequest, ChangePasswordRequest, ResetPasswordRequest, UpdateProfileRequest,
    UserResponse,
};
use crate::backend::auth::tokens::{revoke_all_tokens, revoke_other_tokens};
use crate::backend::auth::users::{get_user_by_id, set_password_hash, update_user};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::socket::close_sessions;
use crate::backend::server::state::AppState;
use crate::backend::validation::{parse_uuid, ValidJson};
use crate::shared::ApiResponse;

/// PUT /users/profile
///
/// Changes the caller's display name and/or public key.
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> BackendResult<ApiResponse<UserResponse>> {
    request.validate()?;
    let user = update_user(&pool, caller.user_id, &request.into_update())
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;

    tracing::info!("[Auth] User {} updated their profile", caller.username);
    Ok(ApiResponse::ok_with_message(
        UserResponse::from(user),
        "Update user successfully",
    ))
}

/// PUT /users/change_password
///
/// # Errors
///
/// * `400` - If the new password is out of bounds
/// * `401` - If the current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(request): ValidJson<ChangePasswordRequest>,
) -> BackendResult<ApiResponse<()>> {
    request.validate()?;
    let user = get_user_by_id(&state.db_pool, caller.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;

    // A hash bcrypt cannot parse counts as a mismatch.
    if !verify(&request.current_password, &user.password_hash).unwrap_or(false) {
        tracing::warn!("[Auth] Wrong current password for {}", caller.username);
        return Err(BackendError::auth("Current password incorrect"));
    }

    let password_hash = hash(&request.new_password, DEFAULT_COST)?;
    set_password_hash(&state.db_pool, caller.user_id, &password_hash).await?;
    let revoked = revoke_other_tokens(&state.db_pool, caller.user_id, &caller.jti).await?;

    let mut stale = Vec::new();
    for session_id in state.presence.sessions_for(caller.user_id).await {
        if state.presence.token_for(session_id).await.as_deref() != Some(caller.jti.as_str()) {
            stale.push(session_id);
        }
    }
    close_sessions(&state, stale).await;

    tracing::info!(
        "[Auth] User {} changed password ({} tokens revoked)",
        caller.username,
        revoked
    );
    Ok(ApiResponse::message("Change password successfully"))
}

/// PUT /users/{user_id} (admin only)
pub async fn admin_update_user(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
    ValidJson(request): ValidJson<AdminUpdateUserRequest>,
) -> BackendResult<ApiResponse<UserResponse>> {
    if !caller.is_admin {
        return Err(BackendError::forbidden("Admin permission required"));
    }
    let user_id = parse_uuid("user_id", &user_id)?;
    request.validate()?;

    let user = update_user(&pool, user_id, &request.into_update())
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;

    tracing::info!("[Auth] Admin {} updated user {}", caller.username, user_id);
    Ok(ApiResponse::ok_with_message(
        UserResponse::from(user),
        "Update user successfully",
    ))
}

/// PUT /users/{user_id}/reset_password (admin only)
///
/// Sets a new password and signs the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
    ValidJson(request): ValidJson<ResetPasswordRequest>,
) -> BackendResult<ApiResponse<()>> {
    if !caller.is_admin {
        return Err(BackendError::forbidden("Admin permission required"));
    }
    let user_id = parse_uuid("user_id", &user_id)?;
    request.validate()?;

    let password_hash = hash(&request.new_password, DEFAULT_COST)?;
    if !set_password_hash(&state.db_pool, user_id, &password_hash).await? {
        return Err(BackendError::not_found("Not found user"));
    }
    let revoked = revoke_all_tokens(&state.db_pool, user_id).await?;
    let sessions = state.presence.sessions_for(user_id).await;
    close_sessions(&state, sessions).await;

    tracing::info!(
        "[Auth] Admin {} reset password of {} ({} tokens revoked)",
        caller.username,
        user_id,
        revoked
    );
    Ok(ApiResponse::message("Reset password successfully"))
}
