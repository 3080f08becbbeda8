//! Backend Module
//!
//! All server-side code for Secure Chat: the Axum HTTP API, the WebSocket
//! session layer, presence tracking and the SQLite message log.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Users, JWT issuance, token store, auth handlers
//! - **`chat`** - Conversation keys, message log, unseen tracking, chat handlers
//! - **`groups`** - Group creation and membership
//! - **`realtime`** - Presence registry, session outboxes, fanout, WebSocket handler
//! - **`middleware`** - Bearer-token extractor
//! - **`validation`** - Validated JSON/query extractors and field checks
//! - **`error`** - `BackendError` and its envelope rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── chat/           - Messaging core
//! ├── groups/         - Group management
//! ├── realtime/       - Presence and fanout
//! ├── middleware/     - Request extractors
//! ├── validation.rs   - Request validation
//! └── error/          - Error types
//! ```
//!
//! # Message Flow
//!
//! 1. A message arrives over HTTP (`POST /api/v1/chats/{id}`) or the socket
//!    (`private_chat`)
//! 2. The conversation is resolved and payloads are checked against its members
//! 3. The message and its payloads are written in one transaction
//! 4. After commit, the fanout router pushes the event to every live session
//!    of every participant
//!
//! # Example
//!
//! ```rust,no_run
//! use securechat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5012").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup, state and configuration
pub mod server;

/// HTTP route configuration
pub mod routes;

/// Authentication and user directory
pub mod auth;

/// Messaging core
pub mod chat;

/// Group management
pub mod groups;

/// Presence, outboxes and fanout
pub mod realtime;

/// Request extractors
pub mod middleware;

/// Request validation
pub mod validation;

/// Backend error types
pub mod error;

#[cfg(test)]
pub(crate) mod testing;
