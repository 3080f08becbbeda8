//! Real-time Module
//!
//! Presence tracking and delivery of events to live WebSocket sessions.
//!
//! # Architecture
//!
//! - **`presence`** - Session ↔ user registry, reports online/offline edges
//! - **`transport`** - Bounded per-session outboxes behind the `EventSink` trait
//! - **`fanout`** - Resolves recipients to sessions and pushes events
//! - **`socket`** - `GET /ws` upgrade, session loop and writer task
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── presence.rs   - PresenceRegistry
//! ├── transport.rs  - SocketHub, EventSink, DeliveryError
//! ├── fanout.rs     - FanoutRouter
//! └── socket.rs     - WebSocket handler
//! ```
//!
//! # Delivery
//!
//! Pushes never wait on a client. A full or closed outbox is logged and
//! counted in the `FanoutReport`; there are no retries. Clients that missed
//! events catch up through the HTTP history endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use securechat::backend::realtime::{FanoutRouter, PresenceRegistry, SessionId, SocketHub};
//! use securechat::shared::ServerEvent;
//! use std::sync::Arc;
//!
//! # async fn example(user_id: uuid::Uuid) {
//! let presence = PresenceRegistry::new();
//! let hub = SocketHub::new(64);
//! let fanout = FanoutRouter::new(presence.clone(), Arc::new(hub.clone()));
//!
//! let session = SessionId::new();
//! let _outbox = hub.register(session);
//! presence.authenticate(session, user_id).await;
//! fanout.route(&ServerEvent::Online { user_id }, &[user_id]).await;
//! # }
//! ```

/// Presence registry
pub mod presence;

/// Session outboxes
pub mod transport;

/// Fanout router
pub mod fanout;

/// WebSocket handler
pub mod socket;

pub use fanout::{FanoutReport, FanoutRouter};
pub use presence::{PresenceRegistry, PresenceTransition, SessionId};
pub use socket::ws_handler;
pub use transport::{DeliveryError, EventSink, SocketHub};
