//! Shared Module
//!
//! Wire types exchanged with clients over HTTP and the WebSocket. Nothing in
//! here touches the database pool or the runtime, so client code can depend
//! on these types alone.
//!
//! # Overview
//!
//! - **`envelope`** - The uniform `{status, code, message, data, version}` response
//! - **`event`** - Socket frames (`ClientEvent`, `ServerEvent`)
//! - **`messaging`** - Conversation, message and group DTOs
//! - **`error`** - Field validation errors and helpers

/// Uniform response envelope
pub mod envelope;

/// Socket wire events
pub mod event;

/// Shared error types and field validators
pub mod error;

/// Messaging types
pub mod messaging;

/// Re-export commonly used types for convenience
pub use envelope::{ApiResponse, API_VERSION};
pub use error::SharedError;
pub use event::{ClientEvent, ServerEvent};
