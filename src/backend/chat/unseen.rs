/**
 * Unseen Aggregator
 *
 * Counts and clears unread messages per viewer. Only payload rows of
 * messages sent by someone else count; the sender's own row is born seen.
 */

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::messaging::ConversationId;

/// Mark every unseen message from others in a conversation as seen
///
/// # Returns
/// Number of payload rows flipped; 0 on a repeated call
pub async fn mark_seen(
    pool: &SqlitePool,
    conversation_id: &ConversationId,
    viewer_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE message_payloads
        SET seen = 1, seen_at = ?
        WHERE recipient_id = ?
          AND seen = 0
          AND message_id IN (
            SELECT id FROM messages WHERE conversation_id = ? AND sender_id <> ?
          )
        "#,
    )
    .bind(Utc::now().timestamp_millis())
    .bind(viewer_id)
    .bind(conversation_id)
    .bind(viewer_id)
    .execute(pool)
    .await?;

    let flipped = result.rows_affected();
    if flipped > 0 {
        tracing::debug!(
            "[Chat] {} marked {} messages seen in {}",
            viewer_id,
            flipped,
            conversation_id
        );
    }
    Ok(flipped)
}

/// Unseen messages from others in one conversation
pub async fn count_unseen(
    pool: &SqlitePool,
    conversation_id: &ConversationId,
    viewer_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM message_payloads p
        JOIN messages m ON m.id = p.message_id
        WHERE p.recipient_id = ? AND p.seen = 0
          AND m.conversation_id = ? AND m.sender_id <> ?
        "#,
    )
    .bind(viewer_id)
    .bind(conversation_id)
    .bind(viewer_id)
    .fetch_one(pool)
    .await
}

/// Unseen messages from others across all conversations
pub async fn count_unseen_total(pool: &SqlitePool, viewer_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM message_payloads p
        JOIN messages m ON m.id = p.message_id
        WHERE p.recipient_id = ? AND p.seen = 0 AND m.sender_id <> ?
        "#,
    )
    .bind(viewer_id)
    .bind(viewer_id)
    .fetch_one(pool)
    .await
}
