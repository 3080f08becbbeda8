/**
 * Conversations
 *
 * A conversation is resolved once at the HTTP or socket boundary into a
 * `Conversation`, so the message log never has to guess whether an id names
 * a user pair or a group.
 */

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use super::key::derive_for_users;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::shared::messaging::{ConversationId, ConversationKind};

/// A conversation the caller addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    /// One-to-one chat between two users (possibly the same user)
    Direct { user_a: Uuid, user_b: Uuid },
    /// Group chat, identified by the group's conversation id
    Group { id: ConversationId },
}

impl Conversation {
    pub fn direct(user_a: Uuid, user_b: Uuid) -> Self {
        Self::Direct { user_a, user_b }
    }

    pub fn group(id: ConversationId) -> Self {
        Self::Group { id }
    }

    /// Stable conversation id
    pub fn id(&self) -> ConversationId {
        match self {
            Self::Direct { user_a, user_b } => derive_for_users(*user_a, *user_b),
            Self::Group { id } => id.clone(),
        }
    }

    pub fn kind(&self) -> ConversationKind {
        match self {
            Self::Direct { .. } => ConversationKind::Direct,
            Self::Group { .. } => ConversationKind::Group,
        }
    }
}

/// Row of the `conversations` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub avatar_path: Option<String>,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds, bumped on every new message
    pub updated_at: i64,
}

impl ConversationRecord {
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.created_at).unwrap_or_default()
    }
}

pub(crate) const CONVERSATION_COLUMNS: &str =
    "c.id, c.kind, c.name, c.avatar_path, c.created_at, c.updated_at";

/// Load a conversation row
pub async fn load(
    pool: &SqlitePool,
    id: &ConversationId,
) -> Result<Option<ConversationRecord>, sqlx::Error> {
    sqlx::query_as::<_, ConversationRecord>(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Current members of a conversation
///
/// Takes any executor so the message log can read members inside its
/// transaction.
pub async fn member_ids<'e, E>(executor: E, id: &ConversationId) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT user_id FROM conversation_members WHERE conversation_id = ? ORDER BY joined_at, user_id",
    )
    .bind(id)
    .fetch_all(executor)
    .await
}

pub async fn is_member(
    pool: &SqlitePool,
    id: &ConversationId,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM conversation_members WHERE conversation_id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Resolve a direct conversation with `partner_id`
///
/// # Errors
/// `NotFoundError` if the partner does not exist. Deactivated partners still
/// resolve so their history stays readable.
pub async fn resolve_direct(
    pool: &SqlitePool,
    caller_id: Uuid,
    partner_id: Uuid,
) -> Result<Conversation, BackendError> {
    get_user_by_id(pool, partner_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;
    Ok(Conversation::direct(caller_id, partner_id))
}

/// Resolve a group conversation
///
/// # Errors
/// `NotFoundError` if no group has this id
pub async fn resolve_group(
    pool: &SqlitePool,
    group_id: Uuid,
) -> Result<(Conversation, ConversationRecord), BackendError> {
    let id = ConversationId::for_group(group_id);
    let record = load(pool, &id)
        .await?
        .filter(|record| record.kind == ConversationKind::Group)
        .ok_or_else(|| BackendError::not_found("Not found group"))?;
    Ok((Conversation::group(id), record))
}
