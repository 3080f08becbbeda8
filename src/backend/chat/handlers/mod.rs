//! Chat Handlers Module
//!
//! HTTP handlers for direct and group conversations.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs         - Module exports
//! ├── direct.rs      - /chats routes
//! └── group_chat.rs  - /group_chats routes
//! ```

/// Direct chat handlers
pub mod direct;

/// Group chat handlers
pub mod group_chat;
