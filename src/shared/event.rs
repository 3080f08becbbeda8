/**
 * Socket Wire Events
 *
 * Every WebSocket frame is a JSON object of the form
 * `{"event": "<name>", "data": <payload>}`. `ClientEvent` covers frames the
 * client sends, `ServerEvent` covers frames the server pushes.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::messaging::{ConversationId, MessageView};

/// Frames sent by a connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind this session to the owner of an access token
    Auth { token: String },
    /// The user started typing in a conversation
    TypingStart { conversation_id: ConversationId },
    /// The user stopped typing in a conversation
    TypingStop { conversation_id: ConversationId },
    /// Send a direct message; persisted, then fanned out as `new_private_msg`
    PrivateChat { receiver_id: Uuid, message: String },
}

/// Frames pushed by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Acknowledges a successful `auth`
    Authenticated { user_id: Uuid },
    /// A direct message, carrying the recipient's own payload
    NewPrivateMsg(MessageView),
    /// A group message, carrying the recipient's own payload
    NewGroupMsg(MessageView),
    /// Someone started typing
    TypingStart {
        conversation_id: ConversationId,
        user_id: Uuid,
    },
    /// Someone stopped typing
    TypingStop {
        conversation_id: ConversationId,
        user_id: Uuid,
    },
    /// A user's first session came up
    Online { user_id: Uuid },
    /// A user's last session went away
    Offline { user_id: Uuid },
    /// A user joined a group
    Join { username: String, room: String },
    /// A user left a group
    Leave { username: String, room: String },
    /// A client frame could not be handled
    Error { code: u16, message: String },
}

impl ServerEvent {
    /// Wire name of the event, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::NewPrivateMsg(_) => "new_private_msg",
            Self::NewGroupMsg(_) => "new_group_msg",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::Online { .. } => "online",
            Self::Offline { .. } => "offline",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Error { .. } => "error",
        }
    }

    /// Create an error event
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}
