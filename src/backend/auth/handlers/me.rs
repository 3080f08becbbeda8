/**
 * Get Current User Handler
 *
 * GET /api/v1/users/profile returns the caller's profile together with the
 * number of unseen messages across all of their conversations.
 */

use axum::extract::State;
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{ProfileResponse, UserResponse};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::chat::unseen::count_unseen_total;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::shared::ApiResponse;

/// Get current user handler
///
/// # Errors
///
/// * `401` - If the access token is missing or invalid
/// * `404` - If the user row disappeared
pub async fn get_me(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
) -> BackendResult<ApiResponse<ProfileResponse>> {
    let user = get_user_by_id(&pool, caller.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;
    let unseen_total = count_unseen_total(&pool, caller.user_id).await?;

    Ok(ApiResponse::ok(ProfileResponse {
        user: UserResponse::from(user),
        unseen_total,
    }))
}
