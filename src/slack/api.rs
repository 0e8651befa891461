use super::blocks::{Block, MessageBlock, ModalView};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error returned by the Slack Web API
#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("Slack API HTTP error ({status}) calling {method}: {body}")]
    Http {
        method: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Slack API {method} failed: {error}")]
    Api { method: &'static str, error: String },
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<&'a [Block]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UpdateMessageRequest<'a> {
    channel: &'a str,
    ts: &'a str,
    blocks: &'a [MessageBlock],
}

#[derive(Debug, Serialize)]
struct OpenViewRequest<'a> {
    trigger_id: &'a str,
    view: &'a ModalView,
}

/// What to post with `chat.postMessage`
#[derive(Debug, Clone, Copy)]
pub enum MessageContent<'a> {
    Text(&'a str),
    Blocks(&'a [Block]),
}

/// Minimal Slack Web API client (bot token)
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl SlackClient {
    pub fn new(client: reqwest::Client, token: &str, api_url: &str) -> Self {
        Self {
            client,
            token: token.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// `chat.postMessage`; returns the new message's `ts`
    pub async fn post_message(
        &self,
        channel: &str,
        content: MessageContent<'_>,
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let (text, blocks) = match content {
            MessageContent::Text(text) => (Some(text), None),
            MessageContent::Blocks(blocks) => (None, Some(blocks)),
        };
        let request = PostMessageRequest {
            channel,
            text,
            blocks,
            thread_ts,
        };

        let response = self.call("chat.postMessage", &request).await?;
        Ok(response.ts.unwrap_or_default())
    }

    /// `chat.update` replacing the message's blocks
    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        blocks: &[MessageBlock],
    ) -> Result<()> {
        let request = UpdateMessageRequest {
            channel,
            ts,
            blocks,
        };
        self.call("chat.update", &request).await?;
        Ok(())
    }

    /// `views.open` for a modal
    pub async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<()> {
        let request = OpenViewRequest { trigger_id, view };
        self.call("views.open", &request).await?;
        Ok(())
    }

    async fn call<T: Serialize>(&self, method: &'static str, body: &T) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.api_url, method);
        debug!("Calling Slack API {}", method);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context(format!("Failed to send request to Slack API ({})", method))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackApiError::Http {
                method,
                status,
                body,
            }
            .into());
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context(format!("Failed to parse Slack API response ({})", method))?;

        if !api_response.ok {
            return Err(SlackApiError::Api {
                method,
                error: api_response
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown_error".to_string()),
            }
            .into());
        }

        Ok(api_response)
    }
}
