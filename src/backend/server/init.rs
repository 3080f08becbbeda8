/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including database loading, state creation and route configuration.
 *
 * # Initialization Process
 *
 * 1. Open the SQLite pool and run migrations
 * 2. Create the presence registry, socket hub and fanout router
 * 3. Create and configure the router
 * 4. Start the periodic token pruning task
 */

use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;

use crate::backend::auth::tokens::prune_expired;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ConfigError, ServerConfig};
use crate::backend::server::state::AppState;

/// How often expired tokens are deleted
const TOKEN_PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

/// Create and configure the Axum application
///
/// # Arguments
///
/// * `config` - Loaded server configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Errors
///
/// Fails if the database cannot be opened or migrated
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, ConfigError> {
    tracing::info!("[Server] Initializing Secure Chat backend");

    let db_pool = load_database(&config).await?;
    tracing::info!("[Server] Database ready at {}", config.database_url);

    let app_state = AppState::new(db_pool.clone(), config);
    let app = create_router(app_state);

    spawn_token_pruning(db_pool);
    tracing::info!("[Server] Router configured with periodic token pruning");

    Ok(app)
}

fn spawn_token_pruning(pool: SqlitePool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            match prune_expired(&pool).await {
                Ok(0) => {}
                Ok(pruned) => tracing::debug!("[Server] Pruned {} expired tokens", pruned),
                Err(e) => tracing::warn!("[Server] Token pruning failed: {}", e),
            }
        }
    });
}
