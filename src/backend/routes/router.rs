/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Layout
 *
 * 1. `GET /ws` - WebSocket sessions
 * 2. `/api/v1/...` - Auth, users, chats, group chats and groups
 * 3. Fallback handler (404 envelope)
 *
 * Every HTTP response, including the fallback, is the JSON envelope.
 */

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::realtime::ws_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;
use crate::shared::ApiResponse;

/// Prefix of every HTTP endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Database pool, presence, fanout and configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let api = configure_chat_routes(configure_api_routes(Router::new()));

    Router::new()
        .route("/ws", get(ws_handler))
        .nest(API_PREFIX, api)
        .fallback(|| async { ApiResponse::<()>::error(404, "Not found") })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
