/**
 * API Route Handlers
 *
 * Auth and user directory endpoints, mounted under `/api/v1`.
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /auth/login` - Issue access and refresh tokens
 * - `POST /auth/refresh` - New access token from a refresh token
 * - `DELETE /auth/logout` - Revoke the current access token
 *
 * ## Users
 * - `POST /users` - Registration
 * - `GET /users/profile` - Caller's profile and unseen total
 * - `PUT /users/profile` - Change display name or public key
 * - `PUT /users/change_password` - Change password, revoke other tokens
 * - `GET /users/friends` - Users the caller shares a conversation with
 * - `GET /users/{user_id}` - Public profile
 * - `GET /users/{user_id}/online` - Presence lookup
 * - `PUT /users/{user_id}` - Edit a user (admin only)
 * - `PUT /users/{user_id}/reset_password` - Set a new password (admin only)
 * - `DELETE /users/{user_id}` - Deactivate (admin only)
 */

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::auth::handlers::{
    admin_update_user, change_password, deactivate_user, get_friends, get_me, get_online,
    get_user, login, logout, refresh, reset_password, signup, update_profile,
};
use crate::backend::server::state::AppState;

/// Configure auth and user routes
///
/// Public routes are signup, login and refresh (the refresh token is checked
/// in the handler). Everything else requires `Authorization: Bearer <access>`.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", delete(logout))
        .route("/users", post(signup))
        .route("/users/profile", get(get_me).put(update_profile))
        .route("/users/change_password", put(change_password))
        .route("/users/friends", get(get_friends))
        .route(
            "/users/{user_id}",
            get(get_user).put(admin_update_user).delete(deactivate_user),
        )
        .route("/users/{user_id}/online", get(get_online))
        .route("/users/{user_id}/reset_password", put(reset_password))
}
