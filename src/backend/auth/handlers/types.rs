/**
 * Authentication Handler Types
 *
 * This module defines the request and response types used by the auth and
 * user directory handlers.
 */

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::users::{User, UserUpdate};
use crate::shared::error::{require_length, require_username, SharedError};

/// Registration request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SignupRequest {
    /// 3-50 chars, starts with a letter, letters/digits/underscore
    pub username: String,
    /// 6-50 chars, no whitespace
    pub password: String,
    /// 1-50 chars
    pub display_name: String,
    /// Public key clients use to encrypt payloads for this user
    pub pub_key: String,
}

impl SignupRequest {
    /// Check field bounds before touching the database
    pub fn validate(&self) -> Result<(), SharedError> {
        require_username(self.username.trim())?;
        require_password("password", &self.password)?;
        require_length("display_name", &self.display_name, 1, 50)?;
        require_length("pub_key", &self.pub_key, 1, 4096)?;
        Ok(())
    }
}

/// 6-50 chars, no whitespace
fn require_password(field: &str, password: &str) -> Result<(), SharedError> {
    require_length(field, password, 6, 50)?;
    if password.chars().any(char::is_whitespace) {
        return Err(SharedError::validation(field, "cannot contain spaces"));
    }
    Ok(())
}

fn require_profile_fields(
    display_name: Option<&str>,
    pub_key: Option<&str>,
) -> Result<(), SharedError> {
    if let Some(display_name) = display_name {
        require_length("display_name", display_name, 1, 50)?;
    }
    if let Some(pub_key) = pub_key {
        require_length("pub_key", pub_key, 1, 4096)?;
    }
    Ok(())
}

/// `PUT /users/profile`
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    /// Rotating the key only affects messages sent afterwards
    pub pub_key: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.display_name.is_none() && self.pub_key.is_none() {
            return Err(SharedError::validation("profile", "nothing to update"));
        }
        require_profile_fields(self.display_name.as_deref(), self.pub_key.as_deref())
    }

    pub fn into_update(self) -> UserUpdate {
        UserUpdate {
            display_name: self.display_name.map(|name| name.trim().to_string()),
            pub_key: self.pub_key,
            is_admin: None,
        }
    }
}

/// `PUT /users/{user_id}` (admin only)
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AdminUpdateUserRequest {
    pub display_name: Option<String>,
    pub pub_key: Option<String>,
    pub is_admin: Option<bool>,
}

impl AdminUpdateUserRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.display_name.is_none() && self.pub_key.is_none() && self.is_admin.is_none() {
            return Err(SharedError::validation("user", "nothing to update"));
        }
        require_profile_fields(self.display_name.as_deref(), self.pub_key.as_deref())
    }

    pub fn into_update(self) -> UserUpdate {
        UserUpdate {
            display_name: self.display_name.map(|name| name.trim().to_string()),
            pub_key: self.pub_key,
            is_admin: self.is_admin,
        }
    }
}

/// `PUT /users/change_password`
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_password("new_password", &self.new_password)
    }
}

/// `PUT /users/{user_id}/reset_password` (admin only)
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_password("new_password", &self.new_password)
    }
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by login
///
/// Both tokens are recorded in the token store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
}

/// Returned by refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub pub_key: String,
    pub avatar_path: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            pub_key: user.pub_key,
            avatar_path: user.avatar_path,
            is_admin: user.is_admin,
            created_at: Utc
                .timestamp_millis_opt(user.created_at)
                .single()
                .unwrap_or_default(),
        }
    }
}

/// Profile of the current user with their unread badge
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Unseen messages across all conversations
    pub unseen_total: i64,
}

/// Presence answer for `GET /users/{user_id}/online`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OnlineResponse {
    pub user_id: Uuid,
    pub online: bool,
}
