use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_TRANSLATION_API_URL: &str = "https://translation.googleapis.com";
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TARGET_CHANNEL_ID: &str = "C09SQ9N05MZ";

/// Where configuration values come from.
///
/// With `SECRET_NAME` set, values are read from that AWS Secrets Manager
/// secret (a flat JSON object) and anything missing from it falls back to the
/// environment. Without it, the environment is used directly.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    secret: Option<Map<String, Value>>,
}

impl ConfigSource {
    /// Environment only
    pub fn env() -> Self {
        Self { secret: None }
    }

    /// Secret object with environment fallback
    pub fn from_secret_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("Failed to parse secret JSON")?;
        match value {
            Value::Object(map) => Ok(Self { secret: Some(map) }),
            _ => bail!("Secret must be a JSON object"),
        }
    }

    /// Load from Secrets Manager when `SECRET_NAME` is set, else the environment
    pub async fn load() -> Result<Self> {
        let secret_name = match std::env::var("SECRET_NAME") {
            Ok(name) if !name.is_empty() => name,
            _ => {
                info!("SECRET_NAME not set, reading configuration from environment");
                return Ok(Self::env());
            }
        };

        let aws_config = aws_config::load_from_env().await;
        let client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let output = client
            .get_secret_value()
            .secret_id(&secret_name)
            .send()
            .await
            .context(format!("Failed to load secret '{}'", secret_name))?;

        let secret_string = output
            .secret_string()
            .context(format!("Secret '{}' has no string value", secret_name))?;

        let source = Self::from_secret_json(secret_string)?;
        info!("✓ Configuration loaded from Secrets Manager (secret={})", secret_name);
        Ok(source)
    }

    /// Look up `key`. Nested JSON values are returned serialized.
    pub fn get(&self, key: &str) -> Option<String> {
        let from_secret = self.secret.as_ref().and_then(|map| map.get(key)).and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        from_secret
            .or_else(|| std::env::var(key).ok())
            .filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key).context(format!("{} not set", key))
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn port(&self) -> Result<u16> {
        match self.get("PORT") {
            Some(port) => port.parse().context(format!("Invalid PORT: {}", port)),
            None => Ok(8080),
        }
    }
}

/// Slack credentials shared by both bots.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
    pub api_url: String,
}

impl SlackConfig {
    fn from_source(source: &ConfigSource) -> Result<Self> {
        Ok(Self {
            bot_token: source.require("SLACK_BOT_TOKEN")?,
            signing_secret: source.require("SLACK_SIGNING_SECRET")?,
            api_url: source.get_or("SLACK_API_URL", DEFAULT_SLACK_API_URL),
        })
    }
}

/// translate-bot configuration
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub slack: SlackConfig,

    // Google Cloud Translation
    pub google_cloud_project_id: String,
    pub google_translate_location: String,
    pub translation_api_url: String,

    /// Service account (or authorized user) JSON
    pub google_creds: Option<String>,

    pub port: u16,
}

impl TranslateConfig {
    pub fn from_source(source: &ConfigSource) -> Result<Self> {
        let config = Self {
            slack: SlackConfig::from_source(source)?,
            google_cloud_project_id: source.require("GOOGLE_CLOUD_PROJECT_ID")?,
            google_translate_location: source.get_or("GOOGLE_TRANSLATE_API_LOCATION", "global"),
            translation_api_url: source
                .get_or("TRANSLATION_API_URL", DEFAULT_TRANSLATION_API_URL),
            google_creds: source.get("GOOGLE_CREDS"),
            port: source.port()?,
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!("SLACK_BOT_TOKEN: {} chars", self.slack.bot_token.len());
        info!("SLACK_SIGNING_SECRET: {} chars", self.slack.signing_secret.len());
        info!("GOOGLE_CLOUD_PROJECT_ID: {}", self.google_cloud_project_id);
        info!("GOOGLE_TRANSLATE_API_LOCATION: {}", self.google_translate_location);
        match &self.google_creds {
            Some(creds) => info!("GOOGLE_CREDS: {} bytes", creds.len()),
            None => warn!("GOOGLE_CREDS is empty, falling back to default credentials"),
        }
    }
}

/// bamboo-forest configuration
#[derive(Debug, Clone)]
pub struct BambooConfig {
    pub slack: SlackConfig,

    /// Channel anonymous posts go to
    pub target_channel_id: String,

    // Anonymous reactions (Google Sheets); both must be set to enable
    pub google_creds: Option<String>,
    pub sheets_id: Option<String>,
    pub sheets_api_url: String,

    pub port: u16,
}

impl BambooConfig {
    pub fn from_source(source: &ConfigSource) -> Result<Self> {
        Ok(Self {
            slack: SlackConfig::from_source(source)?,
            target_channel_id: source.get_or("TARGET_CHANNEL_ID", DEFAULT_TARGET_CHANNEL_ID),
            google_creds: source.get("GOOGLE_CREDS"),
            sheets_id: source.get("SHEETS_ID").filter(|id| id != "PLACEHOLDER"),
            sheets_api_url: source.get_or("SHEETS_API_URL", DEFAULT_SHEETS_API_URL),
            port: source.port()?,
        })
    }

    /// Credentials and sheet id, if reactions are configured
    pub fn reactions_settings(&self) -> Option<(&str, &str)> {
        match (&self.google_creds, &self.sheets_id) {
            (Some(creds), Some(id)) => Some((creds.as_str(), id.as_str())),
            _ => None,
        }
    }
}
