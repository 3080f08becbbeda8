//! Unit test fixtures: an in-memory database with migrations applied.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::backend::auth::users::{create_user, NewUser, User};

/// One connection that never idles out, so the in-memory database lives as
/// long as the pool.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub async fn user(pool: &SqlitePool, username: &str) -> User {
    create_user(
        pool,
        NewUser {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            display_name: username.to_string(),
            pub_key: format!("pk-{username}"),
            is_admin: false,
        },
    )
    .await
    .unwrap()
}
