/**
 * Group Storage
 *
 * Groups are rows of `conversations` with `kind = 'group'`; the group id is
 * the conversation id. Membership lives in `conversation_members`.
 */

use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::chat::conversation::{member_ids, ConversationRecord, CONVERSATION_COLUMNS};
use crate::backend::error::BackendError;
use crate::shared::messaging::{ConversationId, GroupMember};

/// Create a group, or return the existing group with the same member set
///
/// The creator is always a member. Every member must exist.
///
/// # Returns
/// The group record and whether it was newly created
pub async fn create_group(
    pool: &SqlitePool,
    name: &str,
    member_ids_in: &[Uuid],
    creator_id: Uuid,
) -> Result<(ConversationRecord, bool), BackendError> {
    let members: BTreeSet<Uuid> = member_ids_in
        .iter()
        .copied()
        .chain(std::iter::once(creator_id))
        .collect();

    for user_id in &members {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(BackendError::not_found(format!("Not found user {user_id}")));
        }
    }

    if let Some(existing) = find_group_with_members(pool, creator_id, &members).await? {
        tracing::info!("[Groups] Reusing group {} with identical members", existing.id);
        return Ok((existing, false));
    }

    let id = ConversationId::for_group(Uuid::new_v4());
    let now = Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO conversations (id, kind, name, created_at, updated_at) VALUES (?, 'group', ?, ?, ?)",
    )
    .bind(&id)
    .bind(name.trim())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for user_id in &members {
        sqlx::query(
            "INSERT INTO conversation_members (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!("[Groups] Created group {} with {} members", id, members.len());
    let record = get_group(pool, &id)
        .await?
        .ok_or_else(|| BackendError::internal("group vanished after insert"))?;
    Ok((record, true))
}

async fn find_group_with_members(
    pool: &SqlitePool,
    creator_id: Uuid,
    members: &BTreeSet<Uuid>,
) -> Result<Option<ConversationRecord>, sqlx::Error> {
    let candidates = sqlx::query_as::<_, ConversationRecord>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations c
        JOIN conversation_members cm ON cm.conversation_id = c.id
        WHERE c.kind = 'group' AND cm.user_id = ?
          AND (SELECT COUNT(*) FROM conversation_members x WHERE x.conversation_id = c.id) = ?
        ORDER BY c.created_at
        "#
    ))
    .bind(creator_id)
    .bind(i64::try_from(members.len()).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;

    for candidate in candidates {
        let current: BTreeSet<Uuid> = member_ids(pool, &candidate.id).await?.into_iter().collect();
        if &current == members {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Load a group record
pub async fn get_group(
    pool: &SqlitePool,
    id: &ConversationId,
) -> Result<Option<ConversationRecord>, sqlx::Error> {
    sqlx::query_as::<_, ConversationRecord>(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = ? AND c.kind = 'group'"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Members with their public names
pub async fn group_members(
    pool: &SqlitePool,
    id: &ConversationId,
) -> Result<Vec<GroupMember>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct MemberRow {
        id: Uuid,
        username: String,
        display_name: String,
    }

    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT u.id, u.username, u.display_name
        FROM conversation_members cm
        JOIN users u ON u.id = cm.user_id
        WHERE cm.conversation_id = ?
        ORDER BY cm.joined_at, u.username
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| GroupMember {
            user_id: row.id,
            username: row.username,
            display_name: row.display_name,
        })
        .collect())
}

/// Groups `user_id` belongs to, most recently active first
pub async fn groups_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
    page: u32,
    page_size: u32,
) -> Result<Vec<ConversationRecord>, sqlx::Error> {
    let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
    sqlx::query_as::<_, ConversationRecord>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations c
        JOIN conversation_members cm ON cm.conversation_id = c.id
        WHERE c.kind = 'group' AND cm.user_id = ?
        ORDER BY c.updated_at DESC, c.id
        LIMIT ? OFFSET ?
        "#
    ))
    .bind(user_id)
    .bind(i64::from(page_size))
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// # Returns
/// `true` if the group exists
pub async fn rename_group(
    pool: &SqlitePool,
    id: &ConversationId,
    name: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE conversations SET name = ?, updated_at = ? WHERE id = ? AND kind = 'group'",
    )
    .bind(name.trim())
    .bind(Utc::now().timestamp_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// # Returns
/// `true` if the user was not a member yet
pub async fn add_member(
    pool: &SqlitePool,
    id: &ConversationId,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO conversation_members (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(Utc::now().timestamp_millis())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// # Returns
/// `true` if the user was a member
pub async fn remove_member(
    pool: &SqlitePool,
    id: &ConversationId,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM conversation_members WHERE conversation_id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a group with its messages, payloads and memberships
///
/// # Returns
/// `true` if the group existed
pub async fn delete_group(pool: &SqlitePool, id: &ConversationId) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM message_payloads WHERE message_id IN (SELECT id FROM messages WHERE conversation_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM conversation_members WHERE conversation_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM conversations WHERE id = ? AND kind = 'group'")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        tx.rollback().await?;
        return Ok(false);
    }
    tx.commit().await?;
    Ok(true)
}
