//! Chat Backend Module
//!
//! Conversations, the message log, unread tracking and delivery of new
//! messages to live sessions.
//!
//! # Architecture
//!
//! - **`key`** - Deterministic conversation ids for user pairs
//! - **`conversation`** - `Conversation` type and membership queries
//! - **`db`** - Message log (append, page, delete)
//! - **`unseen`** - Unread counts and mark-as-seen
//! - **`delivery`** - Fanout of committed messages
//! - **`handlers`** - `/chats` and `/group_chats` routes
//!
//! # Flow
//!
//! ```text
//! POST /chats/{id} → append (one transaction) → notify_new_message → fanout
//! GET  /chats/{id} → get_page → mark_seen
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use securechat::backend::chat::conversation::Conversation;
//! use securechat::backend::chat::db::append;
//! use std::collections::HashMap;
//! # async fn example(pool: sqlx::SqlitePool, alice: uuid::Uuid, bob: uuid::Uuid) {
//! let conversation = Conversation::direct(alice, bob);
//! let payloads = HashMap::from([(alice, "a".to_string()), (bob, "b".to_string())]);
//! let stored = append(&pool, &conversation, alice, &payloads).await;
//! # }
//! ```

/// Conversation key derivation
pub mod key;

/// Conversation type and membership
pub mod conversation;

/// Message log
pub mod db;

/// Unread tracking
pub mod unseen;

/// Delivery of new messages
pub mod delivery;

/// HTTP handlers
pub mod handlers;

pub use conversation::Conversation;
pub use db::StoredMessage;
