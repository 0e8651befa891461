use anyhow::Result;
use slack_team_bots::{
    config::{ConfigSource, TranslateConfig},
    server,
    translate_bot::{self, TranslateBot},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    server::init_tracing()?;

    info!("Starting translate-bot");

    let source = ConfigSource::load().await?;
    let config = TranslateConfig::from_source(&source)?;

    let bot = Arc::new(TranslateBot::from_config(&config)?);

    server::serve(translate_bot::router(bot), config.port).await
}
