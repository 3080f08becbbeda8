//! Secure Chat - Main Library
//!
//! Secure Chat is an end-to-end encrypted chat backend. Clients encrypt each
//! message once per recipient; the server stores the ciphertexts, tracks who
//! is online and pushes new messages to every live session of every
//! participant.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types used by the server and clients
//!   - Response envelope, socket events, conversation ids
//!   - Request and response bodies for chats and groups
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP API under `/api/v1` and the `/ws` WebSocket endpoint
//!   - Presence registry and fanout router
//!   - SQLite message log with per-recipient payloads and seen tracking
//!   - JWT authentication with a revocable token store
//!
//! # Usage
//!
//! ```rust,no_run
//! use securechat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Model
//!
//! Delivery to live sessions is best effort: a full or closed outbox is
//! logged and skipped. The message log is the source of truth, and clients
//! catch up with `GET /api/v1/chats/{partner_id}` after reconnecting.

/// Types shared by the server and clients
pub mod shared;

/// Server-side code
pub mod backend;
