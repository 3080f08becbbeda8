//! Authentication test helpers
//!
//! Provides utilities for creating test users and issuing tokens that the
//! token store accepts.

use securechat::backend::auth::sessions::TokenType;
use securechat::backend::auth::tokens::issue_token;
use securechat::backend::auth::users::{create_user, NewUser, User};
use securechat::backend::server::ServerConfig;
use sqlx::SqlitePool;

/// Test user with a recorded access token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> uuid::Uuid {
        self.user.id
    }
}

/// Create a user without going through bcrypt
pub async fn create_plain_user(pool: &SqlitePool, username: &str, is_admin: bool) -> User {
    create_user(
        pool,
        NewUser {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            display_name: username.to_string(),
            pub_key: format!("pk-{username}"),
            is_admin,
        },
    )
    .await
    .expect("Failed to create test user")
}

/// Create a user and issue an access token signed with the default config
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> TestUser {
    with_token(pool, create_plain_user(pool, username, false).await).await
}

/// Same as `create_test_user` with the admin flag set
pub async fn create_test_admin(pool: &SqlitePool, username: &str) -> TestUser {
    with_token(pool, create_plain_user(pool, username, true).await).await
}

/// A second access token for the same user, as from another login
pub async fn another_token(pool: &SqlitePool, test_user: &TestUser) -> TestUser {
    with_token(pool, test_user.user.clone()).await
}

async fn with_token(pool: &SqlitePool, user: User) -> TestUser {
    let config = ServerConfig::default();
    let issued = issue_token(pool, &config.auth, &user, TokenType::Access)
        .await
        .expect("Failed to issue test token");
    TestUser {
        user,
        token: issued.token,
    }
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
