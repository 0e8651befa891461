use anyhow::Result;
use slack_team_bots::{
    bamboo::{self, BambooApp},
    config::{BambooConfig, ConfigSource},
    server,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    server::init_tracing()?;

    info!("Starting bamboo-forest");

    let source = ConfigSource::load().await?;
    let config = BambooConfig::from_source(&source)?;

    let app = Arc::new(BambooApp::from_config(&config));

    server::serve(bamboo::router(app), config.port).await
}
