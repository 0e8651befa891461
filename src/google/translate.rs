use super::auth::TokenProvider;
use crate::translation::TargetLanguage;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound for one translation (token fetch included)
pub const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest<'a> {
    contents: &'a [String],
    target_language_code: &'a str,
    mime_type: &'a str,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Cloud Translation v3 client using the translation LLM model
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    auth: Arc<TokenProvider>,
    project_id: String,
    location: String,
    api_url: String,
    timeout: Duration,
}

impl GoogleTranslator {
    pub fn new(
        client: reqwest::Client,
        auth: Arc<TokenProvider>,
        project_id: &str,
        location: &str,
        api_url: &str,
    ) -> Self {
        let location = if location.is_empty() { "global" } else { location };
        Self {
            client,
            auth,
            project_id: project_id.to_string(),
            location: location.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: TRANSLATE_TIMEOUT,
        }
    }

    /// Override the per-translation bound (defaults to [`TRANSLATE_TIMEOUT`])
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v3/projects/{}/locations/{}:translateText",
            self.api_url, self.project_id, self.location
        )
    }

    fn model(&self) -> String {
        format!(
            "projects/{}/locations/{}/models/general/translation-llm",
            self.project_id, self.location
        )
    }

    /// Translate `chunks` in one request; output order matches input order.
    ///
    /// Single attempt; token fetch and request together are bounded by the
    /// translator's timeout.
    pub async fn translate(&self, chunks: &[String], target: TargetLanguage) -> Result<Vec<String>> {
        tokio::time::timeout(self.timeout, self.translate_inner(chunks, target))
            .await
            .context(format!("Translation timed out after {:?}", self.timeout))?
    }

    async fn translate_inner(
        &self,
        chunks: &[String],
        target: TargetLanguage,
    ) -> Result<Vec<String>> {
        info!(
            "Requesting translation (target={}, chunks={})",
            target,
            chunks.len()
        );

        let token = self
            .auth
            .access_token()
            .await
            .context("Failed to get Google access token")?;

        let request = TranslateTextRequest {
            contents: chunks,
            target_language_code: target.code(),
            mime_type: "text/plain",
            model: self.model(),
        };

        let url = self.endpoint();
        debug!("Calling translation API: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to translation API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read translation API response")?;
        debug!("Translation API response: status={}, body={} bytes", status, body.len());

        if !status.is_success() {
            bail!("Translation API error ({}): {}", status, body);
        }

        let parsed: TranslateTextResponse =
            serde_json::from_str(&body).context("Failed to parse translation API response")?;

        if parsed.translations.len() != chunks.len() {
            warn!(
                "Translation chunk count mismatch: sent {}, got {}",
                chunks.len(),
                parsed.translations.len()
            );
            bail!(
                "Translation chunk count mismatch: sent {}, got {}",
                chunks.len(),
                parsed.translations.len()
            );
        }

        Ok(parsed
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}
