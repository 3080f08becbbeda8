//! Groups Module
//!
//! Group conversations: creation with member-set deduplication, renaming,
//! membership changes and deletion.
//!
//! - **`db`** - Storage on top of `conversations` / `conversation_members`
//! - **`handlers`** - `/groups` routes

/// Group storage
pub mod db;

/// HTTP handlers
pub mod handlers;
