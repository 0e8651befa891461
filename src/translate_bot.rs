//! translate-bot: replies to Korean messages in Japanese and vice versa.
//!
//! Slack posts every channel message to the Events API endpoint. Messages
//! in exactly one of the two languages are translated and posted back as a
//! thread reply.

use crate::config::TranslateConfig;
use crate::google::auth::TRANSLATION_SCOPE;
use crate::google::{CredentialSource, GoogleTranslator, TokenProvider};
use crate::security::verify_slack_signature;
use crate::server;
use crate::slack::events::{EventEnvelope, InnerEvent, MessageEvent};
use crate::slack::{MessageContent, SlackClient};
use crate::translation::{ChunkLimits, PreparedMessage};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

const RETRY_HEADER: &str = "x-slack-retry-num";

pub struct TranslateBot {
    slack: SlackClient,
    translator: GoogleTranslator,
    signing_secret: String,
    limits: ChunkLimits,
}

impl TranslateBot {
    pub fn new(slack: SlackClient, translator: GoogleTranslator, signing_secret: &str) -> Self {
        Self {
            slack,
            translator,
            signing_secret: signing_secret.to_string(),
            limits: ChunkLimits::default(),
        }
    }

    /// Build clients from configuration
    pub fn from_config(config: &TranslateConfig) -> Result<Self> {
        let client = reqwest::Client::new();

        let source = CredentialSource::discover(config.google_creds.as_deref())
            .context("Failed to load Google credentials")?;
        let auth = Arc::new(TokenProvider::new(client.clone(), source, TRANSLATION_SCOPE));

        let translator = GoogleTranslator::new(
            client.clone(),
            auth,
            &config.google_cloud_project_id,
            &config.google_translate_location,
            &config.translation_api_url,
        );
        let slack = SlackClient::new(client, &config.slack.bot_token, &config.slack.api_url);

        Ok(Self::new(slack, translator, &config.slack.signing_secret))
    }

    /// Translate one message event and reply in its thread.
    ///
    /// Returns `Ok(false)` when the message was skipped.
    pub async fn process_message(&self, event: &MessageEvent) -> Result<bool> {
        if event.is_from_bot() {
            return Ok(false);
        }

        let Some(prepared) = PreparedMessage::new(&event.text, self.limits) else {
            info!(
                "Skipping message, no translation needed (channel={}, ts={})",
                event.channel, event.ts
            );
            return Ok(false);
        };

        let translated = self
            .translator
            .translate(&prepared.contents(), prepared.target)
            .await?;
        let reply = prepared.finish(&translated)?;

        self.slack
            .post_message(
                &event.channel,
                MessageContent::Text(&reply),
                Some(event.reply_thread_ts()),
            )
            .await
            .context("Failed to post translation")?;

        info!(
            "✓ Posted {} translation ({} chunks, channel={}, ts={})",
            prepared.target.name(),
            prepared.chunk_count(),
            event.channel,
            event.ts
        );
        Ok(true)
    }
}

/// Router for the Events API endpoint
pub fn router(bot: Arc<TranslateBot>) -> Router {
    Router::new()
        .route("/", post(handle_events))
        .route("/slack/events", post(handle_events))
        .with_state(bot)
        .merge(server::health_routes())
}

/// Value of Slack's retry header, if this delivery is a retry
fn retry_num(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(RETRY_HEADER)
        .map(|v| v.to_str().unwrap_or("?"))
}

async fn handle_events(
    State(bot): State<Arc<TranslateBot>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Slack retries when we take longer than 3s; the first delivery already did the work
    if let Some(retry) = retry_num(&headers) {
        info!("Ignoring Slack retry (retry={})", retry);
        return StatusCode::OK.into_response();
    }

    if let Err(e) = verify_slack_signature(
        &headers,
        &body,
        &bot.signing_secret,
        Utc::now().timestamp(),
    ) {
        warn!("Signature verification failed: {}", e);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Failed to parse event payload: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            ([(header::CONTENT_TYPE, "text/plain")], challenge).into_response()
        }
        EventEnvelope::EventCallback {
            event: InnerEvent::Message(message),
        } => {
            if let Err(e) = bot.process_message(&message).await {
                error!("Failed to process message: {:#}", e);
            }
            StatusCode::OK.into_response()
        }
        _ => StatusCode::OK.into_response(),
    }
}
