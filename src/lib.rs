//! Slack team bots: Korean/Japanese auto-translation (`translate-bot`) and
//! anonymous posting (`bamboo-forest`).

pub mod bamboo;
pub mod config;
pub mod google;
pub mod security;
pub mod server;
pub mod slack;
pub mod translate_bot;
pub mod translation;
