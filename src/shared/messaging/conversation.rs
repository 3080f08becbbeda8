//! Conversation Identifiers and Summaries
//!
//! A conversation id is either derived from a pair of user ids (direct chats)
//! or equal to a group's id (group chats). Both are UUID-shaped strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::message::MessageView;

/// Stable identifier of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap an already-derived or stored identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of a group conversation
    pub fn for_group(group_id: Uuid) -> Self {
        Self(group_id.hyphenated().to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of conversation stored in the `conversations` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationKind {
    /// One-to-one chat between two users (or a user and themselves)
    Direct,
    /// Group chat
    Group,
}

/// Entry of the conversation list returned by `GET /chats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    /// Conversation id
    pub conversation_id: ConversationId,
    /// Direct or group
    pub kind: ConversationKind,
    /// The other participant of a direct chat
    pub partner_id: Option<Uuid>,
    /// Group name
    pub name: Option<String>,
    /// Newest message, in the viewer's own payload variant
    pub latest_message: Option<MessageView>,
    /// Messages from others the viewer has not seen yet
    pub unseen_count: i64,
}
