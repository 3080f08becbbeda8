//! Chat Message Data Structures
//!
//! Request and response types for sending and reading messages. A message is
//! stored once with one payload per participant; a `MessageView` is what one
//! participant sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::conversation::ConversationId;
use crate::shared::error::{require_length, SharedError};

/// Maximum payload length (characters)
pub const MAX_PAYLOAD_LENGTH: usize = 10_000;

/// One participant's view of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    /// Message id (UUID v7, ordered by creation time)
    pub id: Uuid,
    /// Conversation the message belongs to
    pub conversation_id: ConversationId,
    /// Author
    pub sender_id: Uuid,
    /// Payload stored for this viewer
    pub payload: String,
    /// For received messages: whether the viewer has seen it.
    /// For sent messages: whether every other recipient has seen it.
    pub seen: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /chats/{receiver_id}` and `POST /group_chats/{group_id}`
///
/// Either a single `message` replicated to every participant, or a
/// `messages` map with one payload per participant (sender included).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Same payload for every participant
    #[serde(default)]
    pub message: Option<String>,
    /// Per-participant payloads
    #[serde(default)]
    pub messages: Option<HashMap<Uuid, String>>,
}

impl SendMessageRequest {
    /// Expand the request into a payload map over `participants`.
    ///
    /// A `messages` map is returned as-is (the message log checks coverage);
    /// a single `message` is copied for every participant.
    pub fn into_payloads(self, participants: &[Uuid]) -> Result<HashMap<Uuid, String>, SharedError> {
        match (self.messages, self.message) {
            (Some(messages), _) => {
                for payload in messages.values() {
                    require_length("messages", payload, 1, MAX_PAYLOAD_LENGTH)?;
                }
                Ok(messages)
            }
            (None, Some(message)) => {
                require_length("message", &message, 1, MAX_PAYLOAD_LENGTH)?;
                let message = message.trim().to_string();
                Ok(participants.iter().map(|id| (*id, message.clone())).collect())
            }
            (None, None) => Err(SharedError::validation("message", "is required")),
        }
    }
}

/// Returned after a message was stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageResponse {
    /// Id of the new message
    pub message_id: Uuid,
    /// Conversation id it was stored under
    pub conversation_id: ConversationId,
}

/// `?page=&page_size=` query parameters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Items per page
    pub page_size: Option<u32>,
}

/// A page of messages, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagePage {
    pub page: u32,
    pub page_size: u32,
    pub messages: Vec<MessageView>,
}
