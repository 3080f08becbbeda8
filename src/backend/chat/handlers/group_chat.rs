/**
 * Group Chat Handlers
 *
 * - `POST /group_chats/{group_id}` - store and fan out a group message
 * - `GET /group_chats/{group_id}` - read a page and mark it seen
 * - `DELETE /group_chats/{message_id}` - delete a message (sender or admin)
 * - `GET /group_chats/{group_id}/online` - is any other member online
 */

use std::sync::Arc;

use axum::extract::{Path, State};
use sqlx::SqlitePool;

use super::direct::delete_message_of_kind;
use crate::backend::chat::conversation::{is_member, member_ids, resolve_group, Conversation};
use crate::backend::chat::db::{append, get_page};
use crate::backend::chat::delivery::notify_new_message;
use crate::backend::chat::unseen::mark_seen;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::{AuthUser, AuthenticatedUser};
use crate::backend::realtime::{FanoutRouter, PresenceRegistry};
use crate::backend::server::config::ServerConfig;
use crate::backend::validation::{parse_uuid, resolve_page, ValidJson, ValidQuery};
use crate::shared::messaging::{
    ConversationKind, GroupOnlineResponse, MessagePage, PageQuery, SendMessageRequest,
    SendMessageResponse,
};
use crate::shared::ApiResponse;

/// Resolve a group the caller may read
///
/// # Returns
/// The conversation and whether the caller is a member (admins may read
/// groups they are not in)
async fn readable_group(
    pool: &SqlitePool,
    caller: &AuthenticatedUser,
    raw_group_id: &str,
) -> Result<(Conversation, bool), BackendError> {
    let group_id = parse_uuid("group_id", raw_group_id)?;
    let (conversation, record) = resolve_group(pool, group_id).await?;
    let member = is_member(pool, &record.id, caller.user_id).await?;
    if !member && !caller.is_admin {
        return Err(BackendError::forbidden("You are not a member of this group"));
    }
    Ok((conversation, member))
}

/// Send a group message
///
/// Members only, admins included.
pub async fn send_message(
    State(pool): State<SqlitePool>,
    State(fanout): State<FanoutRouter>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
    ValidJson(request): ValidJson<SendMessageRequest>,
) -> BackendResult<ApiResponse<SendMessageResponse>> {
    let (conversation, member) = readable_group(&pool, &caller, &group_id).await?;
    if !member {
        return Err(BackendError::forbidden("You are not a member of this group"));
    }

    let members = member_ids(&pool, &conversation.id()).await?;
    let payloads = request.into_payloads(&members)?;
    let stored = append(&pool, &conversation, caller.user_id, &payloads).await?;
    notify_new_message(&fanout, ConversationKind::Group, &stored).await;

    tracing::info!(
        "[Chat] {} sent group message {} to {}",
        caller.username,
        stored.id,
        stored.conversation_id
    );
    Ok(ApiResponse::ok_with_message(
        SendMessageResponse {
            message_id: stored.id,
            conversation_id: stored.conversation_id,
        },
        "Send message successfully",
    ))
}

/// Read a page of a group conversation
///
/// Marks the page seen for members; admins reading as outsiders see no
/// payloads of their own and mark nothing.
pub async fn get_messages(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> BackendResult<ApiResponse<MessagePage>> {
    let (page, page_size) = resolve_page(query, &config.pagination)?;
    let (conversation, member) = readable_group(&pool, &caller, &group_id).await?;
    let conversation_id = conversation.id();

    let messages = get_page(&pool, &conversation_id, caller.user_id, page, page_size).await?;
    if member {
        mark_seen(&pool, &conversation_id, caller.user_id).await?;
    }

    Ok(ApiResponse::ok(MessagePage {
        page,
        page_size,
        messages,
    }))
}

pub async fn delete_message(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    Path(message_id): Path<String>,
) -> BackendResult<ApiResponse<()>> {
    delete_message_of_kind(&pool, &caller, &message_id, ConversationKind::Group).await
}

/// Whether any member other than the caller is online
pub async fn online(
    State(pool): State<SqlitePool>,
    State(presence): State<PresenceRegistry>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
) -> BackendResult<ApiResponse<GroupOnlineResponse>> {
    let (conversation, _) = readable_group(&pool, &caller, &group_id).await?;
    let group_id = conversation.id();
    let members = member_ids(&pool, &group_id).await?;
    let online = presence.is_any_online(&members, caller.user_id).await;

    Ok(ApiResponse::ok(GroupOnlineResponse { group_id, online }))
}
