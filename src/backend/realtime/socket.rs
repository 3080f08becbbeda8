/**
 * WebSocket Sessions
 *
 * `GET /ws` upgrades to a WebSocket. Each connection gets a session id, an
 * outbox in the `SocketHub`, and a writer task that drains the outbox onto
 * the socket with a bounded send timeout. A client that stalls past the
 * timeout loses its session; nobody else waits on it.
 *
 * Frames are JSON `{"event": <name>, "data": <payload>}`. A session must send
 * `auth` before anything else; the first session of a user broadcasts
 * `online`, the last one to close broadcasts `offline`.
 *
 * The token a session authenticated with is re-checked before every action,
 * so a session whose token was revoked or whose user was deactivated falls
 * back to unauthenticated. Logout and deactivation also close the affected
 * sessions outright through `close_sessions`.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use super::fanout::FanoutRouter;
use super::presence::{PresenceTransition, SessionId};
use super::transport::EventSink;
use crate::backend::auth::sessions::TokenType;
use crate::backend::auth::tokens::{authenticate_token, is_revoked};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::chat::conversation::{is_member, load, member_ids, resolve_direct};
use crate::backend::chat::db::append;
use crate::backend::chat::delivery::notify_new_message;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{ConversationId, ConversationKind, SendMessageRequest};
use crate::shared::{ClientEvent, ServerEvent};

/// Upgrade handler for `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = SessionId::new();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut outbox = state.hub.register(session_id);
    state.presence.connect(session_id).await;
    tracing::info!("[Socket] Session {} connected", session_id);

    let send_timeout = state.config.realtime.send_timeout;
    let mut writer = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Socket] Failed to encode {}: {}", event.name(), e);
                    continue;
                }
            };
            match tokio::time::timeout(send_timeout, ws_sender.send(Message::Text(text.into())))
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!("[Socket] Session {} send failed: {}", session_id, e);
                    break;
                }
                Err(_) => {
                    tracing::warn!("[Socket] Session {} send timed out, closing", session_id);
                    break;
                }
            }
        }
        let _ = ws_sender.close().await;
    });

    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle_frame(&state, session_id, text.as_str()).await {
                        reply(&state, session_id, ServerEvent::error(e.code(), e.message()));
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[Socket] Session {} read error: {}", session_id, e);
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    state.hub.unregister(session_id);
    let transition = state.presence.disconnect(session_id).await;
    announce(&state.fanout, transition).await;
    writer.abort();
    tracing::info!("[Socket] Session {} closed", session_id);
}

/// Push an event to this session only
fn reply(state: &AppState, session_id: SessionId, event: ServerEvent) {
    if let Err(e) = state.hub.push(session_id, &event) {
        tracing::debug!("[Socket] Reply to {} dropped: {}", session_id, e);
    }
}

/// Drop live sessions from the hub and the registry
///
/// Each session's writer sees its outbox close and shuts the socket; the
/// session loop's own cleanup is then a no-op. Offline edges are announced.
///
/// # Returns
/// The number of sessions closed
pub async fn close_sessions<I>(state: &AppState, sessions: I) -> usize
where
    I: IntoIterator<Item = SessionId>,
{
    let mut closed = 0;
    for session_id in sessions {
        state.hub.unregister(session_id);
        let transition = state.presence.disconnect(session_id).await;
        announce(&state.fanout, transition).await;
        closed += 1;
    }
    if closed > 0 {
        tracing::info!("[Socket] Closed {} session(s)", closed);
    }
    closed
}

/// Broadcast presence edges to every connected session
pub async fn announce(fanout: &FanoutRouter, transition: PresenceTransition) {
    if let Some(user_id) = transition.went_offline {
        tracing::info!("[Presence] User {} went offline", user_id);
        fanout.broadcast(&ServerEvent::Offline { user_id }).await;
    }
    if let Some(user_id) = transition.came_online {
        tracing::info!("[Presence] User {} came online", user_id);
        fanout.broadcast(&ServerEvent::Online { user_id }).await;
    }
}

async fn handle_frame(state: &AppState, session_id: SessionId, text: &str) -> Result<(), BackendError> {
    let event: ClientEvent = serde_json::from_str(text)
        .map_err(|e| BackendError::validation(format!("Invalid event: {e}")))?;

    match event {
        ClientEvent::Auth { token } => {
            let user = authenticate_token(
                &state.db_pool,
                &state.config.auth,
                &token,
                TokenType::Access,
            )
            .await?;
            let transition = state
                .presence
                .authenticate_with(session_id, user.user_id, Some(user.jti))
                .await;
            reply(state, session_id, ServerEvent::Authenticated { user_id: user.user_id });
            announce(&state.fanout, transition).await;
            tracing::info!("[Socket] Session {} authenticated as {}", session_id, user.username);
        }
        ClientEvent::TypingStart { conversation_id } => {
            let user_id = session_user(state, session_id).await?;
            relay_typing(state, user_id, &conversation_id, true).await?;
        }
        ClientEvent::TypingStop { conversation_id } => {
            let user_id = session_user(state, session_id).await?;
            relay_typing(state, user_id, &conversation_id, false).await?;
        }
        ClientEvent::PrivateChat { receiver_id, message } => {
            let user_id = session_user(state, session_id).await?;
            let conversation = resolve_direct(&state.db_pool, user_id, receiver_id).await?;
            let payloads = SendMessageRequest {
                message: Some(message),
                messages: None,
            }
            .into_payloads(&[user_id, receiver_id])?;

            let stored = append(&state.db_pool, &conversation, user_id, &payloads).await?;
            notify_new_message(&state.fanout, ConversationKind::Direct, &stored).await;
        }
    }
    Ok(())
}

/// User bound to the session, with its credentials re-checked
///
/// A session whose token was revoked or whose user is no longer active is
/// unbound, and the offline edge announced, before the error is returned.
async fn session_user(state: &AppState, session_id: SessionId) -> Result<Uuid, BackendError> {
    let user_id = state
        .presence
        .user_for(session_id)
        .await
        .ok_or_else(|| BackendError::auth("Send auth first"))?;

    if let Some(reason) = credential_failure(state, session_id, user_id).await? {
        tracing::info!("[Socket] Session {} dropped auth: {}", session_id, reason);
        let transition = state.presence.unauthenticate(session_id).await;
        announce(&state.fanout, transition).await;
        return Err(BackendError::auth(reason));
    }
    Ok(user_id)
}

async fn credential_failure(
    state: &AppState,
    session_id: SessionId,
    user_id: Uuid,
) -> Result<Option<&'static str>, BackendError> {
    if let Some(jti) = state.presence.token_for(session_id).await {
        if is_revoked(&state.db_pool, &jti).await? {
            return Ok(Some("Token has been revoked"));
        }
    }
    let active = get_user_by_id(&state.db_pool, user_id)
        .await?
        .is_some_and(|user| user.is_active);
    if !active {
        return Ok(Some("User is inactive or does not exist"));
    }
    Ok(None)
}

/// Forward a typing indicator to the other members of a conversation
async fn relay_typing(
    state: &AppState,
    user_id: Uuid,
    conversation_id: &ConversationId,
    started: bool,
) -> Result<(), BackendError> {
    load(&state.db_pool, conversation_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found conversation"))?;
    if !is_member(&state.db_pool, conversation_id, user_id).await? {
        return Err(BackendError::forbidden("You are not in this conversation"));
    }

    let others: Vec<Uuid> = member_ids(&state.db_pool, conversation_id)
        .await?
        .into_iter()
        .filter(|id| *id != user_id)
        .collect();
    let event = if started {
        ServerEvent::TypingStart {
            conversation_id: conversation_id.clone(),
            user_id,
        }
    } else {
        ServerEvent::TypingStop {
            conversation_id: conversation_id.clone(),
            user_id,
        }
    };
    state.fanout.route(&event, &others).await;
    Ok(())
}
