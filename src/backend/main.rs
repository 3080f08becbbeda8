/**
 * Secure Chat Server Entry Point
 *
 * Loads configuration, opens the database and serves the HTTP API and
 * WebSocket endpoint.
 */

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[Server] Initialization started");

    let config = securechat::backend::server::ServerConfig::load()?;
    let addr = format!("{}:{}", config.host, config.port);

    let app = securechat::backend::server::create_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[Server] Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
