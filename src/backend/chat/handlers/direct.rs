/**
 * Direct Chat Handlers
 *
 * - `POST /chats/{receiver_id}` - store and fan out a direct message
 * - `GET /chats/{partner_id}` - read a page and mark it seen
 * - `DELETE /chats/{message_id}` - delete a message (sender or admin)
 * - `GET /chats` - conversation list with latest message and unseen count
 */

use std::sync::Arc;

use axum::extract::{Path, State};
use sqlx::SqlitePool;

use crate::backend::chat::conversation::{member_ids, resolve_direct};
use crate::backend::chat::db::{self, append, get_page, list_conversations_for};
use crate::backend::chat::delivery::notify_new_message;
use crate::backend::chat::unseen::{count_unseen, mark_seen};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::{AuthUser, AuthenticatedUser};
use crate::backend::realtime::FanoutRouter;
use crate::backend::server::config::ServerConfig;
use crate::backend::validation::{parse_uuid, resolve_page, ValidJson, ValidQuery};
use crate::shared::messaging::{
    ConversationKind, ConversationSummary, MessagePage, PageQuery, SendMessageRequest,
    SendMessageResponse,
};
use crate::shared::ApiResponse;

/// Send a direct message
///
/// The body carries either one `message` stored for both participants or a
/// `messages` map with one payload per participant.
///
/// # Errors
///
/// * `400` - Malformed receiver id or payload coverage
/// * `404` - Receiver does not exist
pub async fn send_message(
    State(pool): State<SqlitePool>,
    State(fanout): State<FanoutRouter>,
    AuthUser(caller): AuthUser,
    Path(receiver_id): Path<String>,
    ValidJson(request): ValidJson<SendMessageRequest>,
) -> BackendResult<ApiResponse<SendMessageResponse>> {
    let receiver_id = parse_uuid("receiver_id", &receiver_id)?;
    let conversation = resolve_direct(&pool, caller.user_id, receiver_id).await?;

    let payloads = request.into_payloads(&[caller.user_id, receiver_id])?;
    let stored = append(&pool, &conversation, caller.user_id, &payloads).await?;
    notify_new_message(&fanout, ConversationKind::Direct, &stored).await;

    tracing::info!(
        "[Chat] {} sent message {} to {}",
        caller.username,
        stored.id,
        receiver_id
    );
    Ok(ApiResponse::ok_with_message(
        SendMessageResponse {
            message_id: stored.id,
            conversation_id: stored.conversation_id,
        },
        "Send message successfully",
    ))
}

/// Read a page of a direct conversation and mark it seen
///
/// The page reflects seen flags from before this read.
pub async fn get_messages(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    AuthUser(caller): AuthUser,
    Path(partner_id): Path<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> BackendResult<ApiResponse<MessagePage>> {
    let partner_id = parse_uuid("partner_id", &partner_id)?;
    let (page, page_size) = resolve_page(query, &config.pagination)?;
    let conversation = resolve_direct(&pool, caller.user_id, partner_id).await?;
    let conversation_id = conversation.id();

    let messages = get_page(&pool, &conversation_id, caller.user_id, page, page_size).await?;
    mark_seen(&pool, &conversation_id, caller.user_id).await?;

    Ok(ApiResponse::ok(MessagePage {
        page,
        page_size,
        messages,
    }))
}

/// Delete one message
///
/// Shared by the direct and group routes; `kind` must match the message's
/// conversation so each route only deletes its own messages.
pub(crate) async fn delete_message_of_kind(
    pool: &SqlitePool,
    caller: &AuthenticatedUser,
    raw_message_id: &str,
    kind: ConversationKind,
) -> BackendResult<ApiResponse<()>> {
    let message_id = parse_uuid("message_id", raw_message_id)?;
    let meta = db::find_message(pool, message_id)
        .await?
        .filter(|meta| meta.kind == kind)
        .ok_or_else(|| BackendError::not_found("Not found message"))?;

    if !caller.is_self_or_admin(meta.sender_id) {
        return Err(BackendError::forbidden(
            "Only the sender or an admin can delete this message",
        ));
    }

    db::delete(pool, message_id).await?;
    tracing::info!("[Chat] {} deleted message {}", caller.username, message_id);
    Ok(ApiResponse::message("Delete message successfully"))
}

pub async fn delete_message(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    Path(message_id): Path<String>,
) -> BackendResult<ApiResponse<()>> {
    delete_message_of_kind(&pool, &caller, &message_id, ConversationKind::Direct).await
}

/// List the caller's conversations, most recently active first
pub async fn list_chats(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
) -> BackendResult<ApiResponse<Vec<ConversationSummary>>> {
    let records = list_conversations_for(&pool, caller.user_id).await?;
    let mut summaries = Vec::with_capacity(records.len());

    for record in records {
        let partner_id = match record.kind {
            ConversationKind::Direct => {
                let members = member_ids(&pool, &record.id).await?;
                Some(
                    members
                        .into_iter()
                        .find(|id| *id != caller.user_id)
                        .unwrap_or(caller.user_id),
                )
            }
            ConversationKind::Group => None,
        };
        summaries.push(ConversationSummary {
            latest_message: db::latest_message(&pool, &record.id, caller.user_id).await?,
            unseen_count: count_unseen(&pool, &record.id, caller.user_id).await?,
            conversation_id: record.id,
            kind: record.kind,
            partner_id,
            name: record.name,
        });
    }

    Ok(ApiResponse::ok(summaries))
}
