//! Bookshelf Server - library catalog and borrowing web application

use std::net::SocketAddr;

use anyhow::Context;
use axum_extra::extract::cookie::Key;
use mongodb::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_server::{
    config::{AppConfig, DatabaseDriver, SessionConfig},
    repository::Repository,
    web, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshelf_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookshelf Server v{}", env!("CARGO_PKG_VERSION"));

    let repository = match config.database.driver {
        DatabaseDriver::Mongodb => {
            let client = Client::with_uri_str(&config.database.url)
                .await
                .context("Failed to connect to MongoDB")?;
            tracing::info!(database = %config.database.name, "Connected to MongoDB");
            Repository::mongo(&client.database(&config.database.name))
        }
        DatabaseDriver::Memory => {
            tracing::warn!("Using the in-memory store, data is lost on shutdown");
            Repository::in_memory()
        }
    };

    let cookie_key = cookie_key(&config.session)?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState::new(config, repository, cookie_key);
    let app = web::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Cookie key from the configured secret, or a fresh random one
fn cookie_key(session: &SessionConfig) -> anyhow::Result<Key> {
    match &session.secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("session.secret must be at least 64 bytes: {}", e)),
        None => {
            tracing::warn!("No session secret configured, sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}
