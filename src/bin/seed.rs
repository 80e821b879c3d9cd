//! Reset the configured database to the demo dataset

use anyhow::Context;
use mongodb::Client;

use bookshelf_server::{config::AppConfig, repository::Repository, services::seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf_server=info,seed=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let client = Client::with_uri_str(&config.database.url)
        .await
        .context("Failed to connect to MongoDB")?;
    let repository = Repository::mongo(&client.database(&config.database.name));

    let report = seed::populate(&repository).await?;

    tracing::info!(
        database = %config.database.name,
        users = report.users,
        books = report.books,
        "Sample data inserted"
    );

    Ok(())
}
