/**
 * User Model and Database Operations
 *
 * The identity directory: user records, lookups by id and username, and
 * friend relationships (users who share a direct conversation).
 */

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique)
    pub username: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub display_name: String,
    /// Public key used by clients to encrypt per-recipient payloads
    pub pub_key: String,
    /// Avatar reference
    pub avatar_path: Option<String>,
    /// Inactive users cannot authenticate
    pub is_active: bool,
    /// Binary admin flag
    pub is_admin: bool,
    /// Created at (epoch milliseconds)
    pub created_at: i64,
    /// Updated at (epoch milliseconds)
    pub updated_at: i64,
}

/// Fields required to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub pub_key: String,
    pub is_admin: bool,
}

/// Profile fields to change; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub pub_key: Option<String>,
    /// Only honoured on the admin route
    pub is_admin: Option<bool>,
}

const USER_COLUMNS: &str = "id, username, password_hash, display_name, pub_key, avatar_path, \
                            is_active, is_admin, created_at, updated_at";

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `new_user` - Registration fields, password already hashed
///
/// # Returns
/// Created user or error
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now().timestamp_millis();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, display_name, pub_key, is_active, is_admin, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(&new_user.display_name)
    .bind(&new_user.pub_key)
    .bind(new_user.is_admin)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(User {
        id,
        username: new_user.username,
        password_hash: new_user.password_hash,
        display_name: new_user.display_name,
        pub_key: new_user.pub_key,
        avatar_path: None,
        is_active: true,
        is_admin: new_user.is_admin,
        created_at: now,
        updated_at: now,
    })
}

/// Get user by username
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Users who share a direct conversation with `user_id`
///
/// Self-chat does not make a user their own friend.
pub async fn list_friends(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM users
        WHERE id <> ?
          AND id IN (
            SELECT other.user_id
            FROM conversation_members mine
            JOIN conversations c ON c.id = mine.conversation_id AND c.kind = 'direct'
            JOIN conversation_members other ON other.conversation_id = mine.conversation_id
            WHERE mine.user_id = ?
          )
        ORDER BY username
        "#
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Apply a partial profile update
///
/// # Returns
/// The updated user, `None` if no such user
pub async fn update_user(
    pool: &SqlitePool,
    user_id: Uuid,
    update: &UserUpdate,
) -> Result<Option<User>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET display_name = COALESCE(?, display_name),
            pub_key = COALESCE(?, pub_key),
            is_admin = COALESCE(?, is_admin),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(update.display_name.as_deref())
    .bind(update.pub_key.as_deref())
    .bind(update.is_admin)
    .bind(Utc::now().timestamp_millis())
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_user_by_id(pool, user_id).await
}

/// Replace a user's password hash
///
/// # Returns
/// `true` if the user exists
pub async fn set_password_hash(
    pool: &SqlitePool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(Utc::now().timestamp_millis())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Activate or deactivate a user
///
/// # Returns
/// `true` if the user exists
pub async fn set_active(pool: &SqlitePool, user_id: Uuid, active: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(active)
        .bind(Utc::now().timestamp_millis())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
