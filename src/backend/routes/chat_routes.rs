/**
 * Chat Route Handlers
 *
 * Direct chats, group chats and group management, mounted under `/api/v1`.
 *
 * The single path segment after `/chats` and `/group_chats` names a user or
 * group for GET/POST and a message for DELETE.
 */

use axum::{
    routing::{get, put},
    Router,
};

use crate::backend::chat::handlers::{direct, group_chat};
use crate::backend::groups::handlers as groups;
use crate::backend::server::state::AppState;

/// Configure chat and group routes
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Direct chats
        .route("/chats", get(direct::list_chats))
        .route(
            "/chats/{id}",
            get(direct::get_messages)
                .post(direct::send_message)
                .delete(direct::delete_message),
        )
        // Group chats
        .route(
            "/group_chats/{id}",
            get(group_chat::get_messages)
                .post(group_chat::send_message)
                .delete(group_chat::delete_message),
        )
        .route("/group_chats/{id}/online", get(group_chat::online))
        // Groups
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/groups/{id}",
            get(groups::get_group)
                .put(groups::rename_group)
                .delete(groups::delete_group),
        )
        .route("/groups/{id}/members", put(groups::update_members))
}
