/**
 * User Directory Handlers
 *
 * Read access to other users, the friend list, presence lookups, and the
 * admin-only deactivation endpoint.
 */

use axum::extract::{Path, State};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{OnlineResponse, UserResponse};
use crate::backend::auth::tokens::revoke_all_tokens;
use crate::backend::auth::users::{get_user_by_id, list_friends, set_active};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::socket::close_sessions;
use crate::backend::realtime::PresenceRegistry;
use crate::backend::server::state::AppState;
use crate::backend::validation::parse_uuid;
use crate::shared::ApiResponse;

/// GET /users/{user_id}
pub async fn get_user(
    State(pool): State<SqlitePool>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<String>,
) -> BackendResult<ApiResponse<UserResponse>> {
    let user_id = parse_uuid("user_id", &user_id)?;
    let user = get_user_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;
    Ok(ApiResponse::ok(UserResponse::from(user)))
}

/// GET /users/friends
///
/// Users the caller shares a direct conversation with.
pub async fn get_friends(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
) -> BackendResult<ApiResponse<Vec<UserResponse>>> {
    let friends = list_friends(&pool, caller.user_id).await?;
    Ok(ApiResponse::ok(
        friends.into_iter().map(UserResponse::from).collect(),
    ))
}

/// GET /users/{user_id}/online
pub async fn get_online(
    State(presence): State<PresenceRegistry>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<String>,
) -> BackendResult<ApiResponse<OnlineResponse>> {
    let user_id = parse_uuid("user_id", &user_id)?;
    let online = presence.is_online(user_id).await;
    Ok(ApiResponse::ok(OnlineResponse { user_id, online }))
}

/// DELETE /users/{user_id} (admin only)
///
/// Deactivates the account, revokes every token it holds and closes its
/// live sessions. The user row and its messages are kept.
pub async fn deactivate_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
) -> BackendResult<ApiResponse<()>> {
    if !caller.is_admin {
        return Err(BackendError::forbidden("Admin permission required"));
    }
    let user_id = parse_uuid("user_id", &user_id)?;
    if user_id == caller.user_id {
        return Err(BackendError::validation("Cannot deactivate yourself"));
    }

    if !set_active(&state.db_pool, user_id, false).await? {
        return Err(BackendError::not_found("Not found user"));
    }
    let revoked = revoke_all_tokens(&state.db_pool, user_id).await?;
    let sessions = state.presence.sessions_for(user_id).await;
    close_sessions(&state, sessions).await;

    tracing::info!(
        "[Auth] Admin {} deactivated user {} ({} tokens revoked)",
        caller.username,
        user_id,
        revoked
    );
    Ok(ApiResponse::message("Delete user successfully"))
}
