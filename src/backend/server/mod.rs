//! Server Module
//!
//! Server setup: configuration, shared state and initialization.
//!
//! - **`config`** - `ServerConfig` from defaults, TOML file and environment
//! - **`state`** - `AppState` and its `FromRef` impls
//! - **`init`** - `create_app`: database, state, router, background tasks

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::create_app;
pub use state::AppState;
