//! OAuth2 access tokens for Google APIs.
//!
//! Supports the credential kinds the bots are deployed with: a service
//! account key (JWT bearer grant), an `authorized_user` file from
//! `gcloud auth application-default login` (refresh token grant), the
//! metadata server, and a fixed token for local runs.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const TRANSLATION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed when they have less than this left
const EXPIRY_MARGIN_SECS: i64 = 60;
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Where access tokens come from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
    /// GCE/Cloud Run metadata server
    Metadata { url: String },
    /// Pre-issued token, never refreshed
    Static(String),
}

impl CredentialSource {
    /// Parse a credentials JSON document (`type` = `service_account` or `authorized_user`)
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct TypeOnly {
            #[serde(rename = "type")]
            kind: Option<String>,
        }

        let kind: TypeOnly =
            serde_json::from_str(json).context("Failed to parse Google credentials JSON")?;

        match kind.kind.as_deref() {
            Some("service_account") | None => {
                let key: ServiceAccountKey = serde_json::from_str(json)
                    .context("Failed to parse service account credentials")?;
                Ok(CredentialSource::ServiceAccount(key))
            }
            Some("authorized_user") => {
                let user: AuthorizedUser = serde_json::from_str(json)
                    .context("Failed to parse authorized user credentials")?;
                Ok(CredentialSource::AuthorizedUser(user))
            }
            Some(other) => bail!("Unsupported Google credentials type: {}", other),
        }
    }

    /// Pick a source: explicit JSON, then `GOOGLE_ACCESS_TOKEN`,
    /// then `GOOGLE_APPLICATION_CREDENTIALS`, then the metadata server.
    pub fn discover(explicit_json: Option<&str>) -> Result<Self> {
        if let Some(json) = explicit_json {
            return Self::from_json(json);
        }

        if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
            if !token.is_empty() {
                info!("Using GOOGLE_ACCESS_TOKEN for Google APIs");
                return Ok(CredentialSource::Static(token));
            }
        }

        if let Ok(path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            if !path.is_empty() {
                let json = std::fs::read_to_string(&path)
                    .context(format!("Failed to read credentials file {}", path))?;
                info!("Using credentials file {}", path);
                return Self::from_json(&json);
            }
        }

        info!("No Google credentials configured, using the metadata server");
        Ok(CredentialSource::Metadata {
            url: METADATA_TOKEN_URL.to_string(),
        })
    }

    fn kind(&self) -> &'static str {
        match self {
            CredentialSource::ServiceAccount(_) => "service_account",
            CredentialSource::AuthorizedUser(_) => "authorized_user",
            CredentialSource::Metadata { .. } => "metadata",
            CredentialSource::Static(_) => "static",
        }
    }
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Caching access-token provider for one scope
#[derive(Debug)]
pub struct TokenProvider {
    client: reqwest::Client,
    source: CredentialSource,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, source: CredentialSource, scope: &str) -> Self {
        Self {
            client,
            source,
            scope: scope.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Current access token, fetching a new one when needed
    pub async fn access_token(&self) -> Result<String> {
        if let CredentialSource::Static(token) = &self.source {
            return Ok(token.clone());
        }

        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        debug!("Fetching Google access token ({})", self.source.kind());
        let response = self.fetch().await?;
        let token = CachedToken {
            value: response.access_token,
            expires_at: now + response.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        };
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    async fn fetch(&self) -> Result<TokenResponse> {
        let request = match &self.source {
            CredentialSource::ServiceAccount(key) => {
                let assertion = sign_assertion(key, &self.scope, Utc::now().timestamp())?;
                self.client.post(&key.token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT),
                    ("assertion", assertion.as_str()),
                ])
            }
            CredentialSource::AuthorizedUser(user) => self.client.post(&user.token_uri).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
            ]),
            CredentialSource::Metadata { url } => self
                .client
                .get(url)
                .query(&[("scopes", self.scope.as_str())])
                .header("Metadata-Flavor", "Google"),
            CredentialSource::Static(token) => {
                return Ok(TokenResponse {
                    access_token: token.clone(),
                    expires_in: None,
                })
            }
        };

        let response = request
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .context("Failed to send Google token request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Google token endpoint error ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse Google token response")
    }
}

/// Build the RS256 JWT assertion for the service account grant
fn sign_assertion(key: &ServiceAccountKey, scope: &str, now: i64) -> Result<String> {
    let claims = JwtClaims {
        iss: &key.client_email,
        scope,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("Invalid service account private key")?;

    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .context("Failed to sign service account assertion")
}
