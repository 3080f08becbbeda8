/**
 * Logout Handler
 *
 * DELETE /api/v1/auth/logout revokes the access token used for the call and
 * closes the socket sessions that authenticated with it.
 */

use axum::extract::State;

use crate::backend::auth::tokens::revoke_token;
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::socket::close_sessions;
use crate::backend::server::state::AppState;
use crate::shared::ApiResponse;

/// Logout handler
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> BackendResult<ApiResponse<()>> {
    revoke_token(&state.db_pool, &user.jti).await?;
    let sessions = state.presence.sessions_with_token(&user.jti).await;
    close_sessions(&state, sessions).await;
    tracing::info!("[Auth] User logged out: {}", user.username);
    Ok(ApiResponse::message("Logout successfully"))
}
