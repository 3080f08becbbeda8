/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The SQLite connection pool
 * - The presence registry (session ↔ user)
 * - The socket hub (per-session outboxes)
 * - The fanout router built on the two above
 * - The loaded configuration
 *
 * Everything is cheap to clone: pools and registries are `Arc`-backed.
 *
 * # Example
 *
 * ```rust,no_run
 * use axum::extract::State;
 * use sqlx::SqlitePool;
 *
 * async fn handler(State(pool): State<SqlitePool>) {
 *     // Use the pool directly
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::realtime::{FanoutRouter, PresenceRegistry, SocketHub};
use crate::backend::server::config::ServerConfig;

/// Application state shared by every handler
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool
    pub db_pool: SqlitePool,

    /// Live sessions per user
    pub presence: PresenceRegistry,

    /// Outboxes of live sessions
    pub hub: SocketHub,

    /// Pushes events to the live sessions of recipients
    pub fanout: FanoutRouter,

    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire presence, hub and fanout together
    pub fn new(db_pool: SqlitePool, config: ServerConfig) -> Self {
        let presence = PresenceRegistry::new();
        let hub = SocketHub::new(config.realtime.session_buffer);
        let fanout = FanoutRouter::new(presence.clone(), Arc::new(hub.clone()));
        Self {
            db_pool,
            presence,
            hub,
            fanout,
            config: Arc::new(config),
        }
    }
}

/// Allows handlers to extract `State<SqlitePool>`
impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

/// Allows handlers to extract `State<PresenceRegistry>`
impl FromRef<AppState> for PresenceRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.presence.clone()
    }
}

impl FromRef<AppState> for SocketHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for FanoutRouter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.fanout.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
