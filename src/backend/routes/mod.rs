//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation (/ws, /api/v1, fallback)
//! ├── api_routes.rs   - Auth and user directory routes
//! └── chat_routes.rs  - Chats, group chats and groups
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use securechat::backend::routes::create_router;
//! use securechat::backend::server::{AppState, ServerConfig};
//!
//! # async fn example(pool: sqlx::SqlitePool) {
//! let app_state = AppState::new(pool, ServerConfig::default());
//! let router = create_router(app_state);
//! # }
//! ```

/// Main router creation
pub mod router;

/// Chat and group route handlers
pub mod chat_routes;

/// Auth and user route handlers
pub mod api_routes;

pub use router::{create_router, API_PREFIX};
