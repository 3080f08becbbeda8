//! Group Data Structures
//!
//! Request and response types for group management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::ConversationId;
use crate::shared::error::{require_length, SharedError};

/// Body of `POST /groups`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    /// Group display name
    pub name: String,
    /// Members to add besides the creator
    pub users_id: Vec<Uuid>,
}

impl CreateGroupRequest {
    /// Validate field bounds
    pub fn validate(&self) -> Result<(), SharedError> {
        require_length("name", &self.name, 1, 100)?;
        if self.users_id.is_empty() {
            return Err(SharedError::validation("users_id", "at least one member is required"));
        }
        Ok(())
    }
}

/// Body of `PUT /groups/{group_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameGroupRequest {
    pub name: String,
}

impl RenameGroupRequest {
    /// Validate field bounds
    pub fn validate(&self) -> Result<(), SharedError> {
        require_length("name", &self.name, 1, 100)
    }
}

/// Membership change direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAction {
    Add,
    Remove,
}

/// Body of `PUT /groups/{group_id}/members`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub user_id: Uuid,
    pub action: MemberAction,
}

/// Public view of a group member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
}

/// Group with its members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupResponse {
    /// Group id, also its conversation id
    pub id: ConversationId,
    pub name: String,
    pub avatar_path: Option<String>,
    pub members: Vec<GroupMember>,
    pub created_at: DateTime<Utc>,
}

/// Answer of `GET /group_chats/{group_id}/online`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupOnlineResponse {
    pub group_id: ConversationId,
    /// Whether any member other than the caller is online
    pub online: bool,
}
