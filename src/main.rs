use std::sync::Arc;

use anyhow::{Context, Result};
use teacher_chatbot::{chatbot::DefaultChatbot, config::Config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teacher_chatbot=info".parse()?),
        )
        .init();

    // Refuse to serve without a usable configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting teacher chatbot with model {}", config.openai_model);

    let chatbot = Arc::new(DefaultChatbot::from_config(&config));
    let app = server::router(chatbot);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
