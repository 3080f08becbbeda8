/**
 * Message Log
 *
 * Append-only store of messages. Each message has one payload row per
 * intended recipient (the sender included), so every participant can get a
 * payload encrypted for their own key. Seen state lives on the payload row.
 *
 * Messages are ordered by `(created_at, seq)`: `seq` is the insertion
 * sequence and breaks ties between messages created in the same millisecond.
 */

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::conversation::{member_ids, Conversation, ConversationRecord, CONVERSATION_COLUMNS};
use crate::backend::error::BackendError;
use crate::shared::messaging::{ConversationId, ConversationKind, MessageView};

/// A message as it was just written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: Uuid,
    pub seq: i64,
    pub conversation_id: ConversationId,
    pub sender_id: Uuid,
    /// Epoch milliseconds
    pub created_at: i64,
    pub payloads: HashMap<Uuid, String>,
}

impl StoredMessage {
    /// The message as `viewer` sees it, if they are a recipient
    pub fn view_for(&self, viewer: Uuid) -> Option<MessageView> {
        let payload = self.payloads.get(&viewer)?;
        // Fresh messages are unseen by everyone but the sender.
        let seen = viewer == self.sender_id && self.payloads.len() == 1;
        Some(MessageView {
            id: self.id,
            conversation_id: self.conversation_id.clone(),
            sender_id: self.sender_id,
            payload: payload.clone(),
            seen,
            created_at: from_millis(self.created_at),
        })
    }

    /// Every recipient, sender included
    pub fn recipients(&self) -> impl Iterator<Item = &Uuid> {
        self.payloads.keys()
    }
}

/// Message metadata, without payloads
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MessageMeta {
    pub id: Uuid,
    pub conversation_id: ConversationId,
    pub kind: ConversationKind,
    pub sender_id: Uuid,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: ConversationId,
    sender_id: Uuid,
    payload: String,
    created_at: i64,
    seen: i64,
}

impl From<MessageRow> for MessageView {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            payload: row.payload,
            seen: row.seen != 0,
            created_at: from_millis(row.created_at),
        }
    }
}

pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Store a message with one payload per participant
///
/// The participant set is `{user_a, user_b}` for a direct chat and the
/// current member set for a group. `payloads` must have exactly one entry
/// per participant and the sender must be one of them. Conversation and
/// membership rows of a direct chat are created on its first message.
///
/// # Errors
/// * `ValidationError` - sender not a participant, missing or extra payloads
/// * `NotFoundError` - group without members
/// * `DatabaseError` - the whole append is rolled back
pub async fn append(
    pool: &SqlitePool,
    conversation: &Conversation,
    sender_id: Uuid,
    payloads: &HashMap<Uuid, String>,
) -> Result<StoredMessage, BackendError> {
    let conversation_id = conversation.id();
    let mut tx = pool.begin().await?;

    let participants: HashSet<Uuid> = match conversation {
        Conversation::Direct { user_a, user_b } => HashSet::from([*user_a, *user_b]),
        Conversation::Group { id } => {
            let members: HashSet<Uuid> = member_ids(&mut *tx, id).await?.into_iter().collect();
            if members.is_empty() {
                return Err(BackendError::not_found("Not found group"));
            }
            members
        }
    };

    if !participants.contains(&sender_id) {
        return Err(BackendError::validation(
            "Sender is not a participant of this conversation",
        ));
    }
    if let Some(missing) = participants.iter().find(|id| !payloads.contains_key(id)) {
        return Err(BackendError::validation(format!(
            "Missing payload for participant {missing}"
        )));
    }
    if let Some(extra) = payloads.keys().find(|id| !participants.contains(id)) {
        return Err(BackendError::validation(format!(
            "Payload for non-participant {extra}"
        )));
    }

    let now = Utc::now().timestamp_millis();

    if let Conversation::Direct { .. } = conversation {
        sqlx::query(
            "INSERT OR IGNORE INTO conversations (id, kind, created_at, updated_at) VALUES (?, 'direct', ?, ?)",
        )
        .bind(&conversation_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for user_id in &participants {
            sqlx::query(
                "INSERT OR IGNORE INTO conversation_members (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
            )
            .bind(&conversation_id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
    }

    let id = Uuid::now_v7();
    let seq = sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&conversation_id)
    .bind(sender_id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for (recipient_id, payload) in payloads {
        let seen = *recipient_id == sender_id;
        sqlx::query(
            "INSERT INTO message_payloads (message_id, recipient_id, payload, seen, seen_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(recipient_id)
        .bind(payload)
        .bind(seen)
        .bind(seen.then_some(now))
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(&conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        "[Chat] Stored message {} in {} for {} recipients",
        id,
        conversation_id,
        payloads.len()
    );

    Ok(StoredMessage {
        id,
        seq,
        conversation_id,
        sender_id,
        created_at: now,
        payloads: payloads.clone(),
    })
}

/// One page of a conversation, newest first, in the viewer's payload variant
///
/// Pages start at 1. A page past the end is empty. For messages the viewer
/// sent, `seen` tells whether every other recipient has seen them.
///
/// # Errors
/// `ValidationError` if `page` or `page_size` is 0
pub async fn get_page(
    pool: &SqlitePool,
    conversation_id: &ConversationId,
    viewer_id: Uuid,
    page: u32,
    page_size: u32,
) -> Result<Vec<MessageView>, BackendError> {
    if page == 0 {
        return Err(BackendError::validation("page must be at least 1"));
    }
    if page_size == 0 {
        return Err(BackendError::validation("page_size must be at least 1"));
    }
    let offset = i64::from(page - 1) * i64::from(page_size);

    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.conversation_id, m.sender_id, p.payload, m.created_at,
               CASE WHEN m.sender_id = ?
                    THEN NOT EXISTS (
                        SELECT 1 FROM message_payloads o
                        WHERE o.message_id = m.id AND o.recipient_id <> ? AND o.seen = 0
                    )
                    ELSE p.seen
               END AS seen
        FROM messages m
        JOIN message_payloads p ON p.message_id = m.id AND p.recipient_id = ?
        WHERE m.conversation_id = ?
        ORDER BY m.created_at DESC, m.seq DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(viewer_id)
    .bind(viewer_id)
    .bind(viewer_id)
    .bind(conversation_id)
    .bind(i64::from(page_size))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(MessageView::from).collect())
}

/// Newest message of a conversation for `viewer_id`
pub async fn latest_message(
    pool: &SqlitePool,
    conversation_id: &ConversationId,
    viewer_id: Uuid,
) -> Result<Option<MessageView>, BackendError> {
    Ok(get_page(pool, conversation_id, viewer_id, 1, 1)
        .await?
        .into_iter()
        .next())
}

/// Look up a message without its payloads
pub async fn find_message(
    pool: &SqlitePool,
    message_id: Uuid,
) -> Result<Option<MessageMeta>, sqlx::Error> {
    sqlx::query_as::<_, MessageMeta>(
        r#"
        SELECT m.id, m.conversation_id, c.kind, m.sender_id, m.created_at
        FROM messages m
        JOIN conversations c ON c.id = m.conversation_id
        WHERE m.id = ?
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await
}

/// Hard-delete a message and its payloads
///
/// # Errors
/// `NotFoundError` if the message does not exist
pub async fn delete(pool: &SqlitePool, message_id: Uuid) -> Result<(), BackendError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM message_payloads WHERE message_id = ?")
        .bind(message_id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(message_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(BackendError::not_found("Not found message"));
    }
    tx.commit().await?;

    tracing::debug!("[Chat] Deleted message {}", message_id);
    Ok(())
}

/// Conversations `user_id` belongs to, most recently active first
pub async fn list_conversations_for(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<ConversationRecord>, sqlx::Error> {
    sqlx::query_as::<_, ConversationRecord>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations c
        JOIN conversation_members cm ON cm.conversation_id = c.id
        WHERE cm.user_id = ?
        ORDER BY c.updated_at DESC, c.id
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}
