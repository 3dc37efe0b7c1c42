//! OpenSASE Variants - combination preview service

use anyhow::Result;
use opensase_variants::api::{self, AppState};
use opensase_variants::config::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = ServerConfig::from_env()?;
    let app = api::router(AppState { editor: config.editor });

    let addr = config.bind_addr();
    tracing::info!(max_combinations = config.editor.max_combinations, "🚀 OpenSASE Variants listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
