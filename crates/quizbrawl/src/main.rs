//! Quizbrawl server entry point.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use quizbrawl::{AppConfig, QuizbrawlServer, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        question_service = %config.question_service.url,
        "starting quizbrawl"
    );

    let server = QuizbrawlServer::from_config(&config).await?;
    server.run().await
}
