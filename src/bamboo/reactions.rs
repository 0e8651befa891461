//! Anonymous emoji reactions.
//!
//! Each reaction is stored as one sheet row: `hash | message ts | emoji | time`.
//! The hash is derived from the reacting user, so the sheet never holds a
//! user id, yet a second click by the same user can be detected.

use super::{ACTION_EMOJI_FLEX, ACTION_EMOJI_HUG, ACTION_EMOJI_THUMBSDOWN, ACTION_EMOJI_THUMBSUP};
use crate::google::SheetsClient;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::fmt;

const HASH_RANGE: &str = "reactions!A:A";
const APPEND_RANGE: &str = "reactions!A:D";
const COUNT_RANGE: &str = "reactions!A:C";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emoji {
    ThumbsUp,
    ThumbsDown,
    Hug,
    Flex,
}

impl Emoji {
    pub const ALL: [Emoji; 4] = [Emoji::ThumbsUp, Emoji::ThumbsDown, Emoji::Hug, Emoji::Flex];

    pub fn from_action_id(action_id: &str) -> Option<Self> {
        match action_id {
            ACTION_EMOJI_THUMBSUP => Some(Emoji::ThumbsUp),
            ACTION_EMOJI_THUMBSDOWN => Some(Emoji::ThumbsDown),
            ACTION_EMOJI_HUG => Some(Emoji::Hug),
            ACTION_EMOJI_FLEX => Some(Emoji::Flex),
            _ => None,
        }
    }

    fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.value() == value)
    }

    pub fn action_id(self) -> &'static str {
        match self {
            Emoji::ThumbsUp => ACTION_EMOJI_THUMBSUP,
            Emoji::ThumbsDown => ACTION_EMOJI_THUMBSDOWN,
            Emoji::Hug => ACTION_EMOJI_HUG,
            Emoji::Flex => ACTION_EMOJI_FLEX,
        }
    }

    /// Value stored in the sheet and carried by the button
    pub fn value(self) -> &'static str {
        match self {
            Emoji::ThumbsUp => "thumbsup",
            Emoji::ThumbsDown => "thumbsdown",
            Emoji::Hug => "hug",
            Emoji::Flex => "flex",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Emoji::ThumbsUp => "👍",
            Emoji::ThumbsDown => "👎",
            Emoji::Hug => "🤗",
            Emoji::Flex => "💪",
        }
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Per-message reaction counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmojiCounts {
    pub thumbs_up: u32,
    pub thumbs_down: u32,
    pub hug: u32,
    pub flex: u32,
}

impl EmojiCounts {
    pub fn add(&mut self, emoji: Emoji) {
        match emoji {
            Emoji::ThumbsUp => self.thumbs_up += 1,
            Emoji::ThumbsDown => self.thumbs_down += 1,
            Emoji::Hug => self.hug += 1,
            Emoji::Flex => self.flex += 1,
        }
    }

    pub fn get(&self, emoji: Emoji) -> u32 {
        match emoji {
            Emoji::ThumbsUp => self.thumbs_up,
            Emoji::ThumbsDown => self.thumbs_down,
            Emoji::Hug => self.hug,
            Emoji::Flex => self.flex,
        }
    }
}

/// Storage for anonymous reactions
#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// True if a reaction with this hash was already recorded
    async fn contains(&self, hash: &str) -> Result<bool>;

    async fn record(&self, hash: &str, message_ts: &str, emoji: Emoji) -> Result<()>;

    /// Current counts for one message
    async fn counts(&self, message_ts: &str) -> Result<EmojiCounts>;
}

/// Reactions kept in the `reactions` sheet of a spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsReactionStore {
    sheets: SheetsClient,
}

impl SheetsReactionStore {
    pub fn new(sheets: SheetsClient) -> Self {
        Self { sheets }
    }
}

#[async_trait]
impl ReactionStore for SheetsReactionStore {
    async fn contains(&self, hash: &str) -> Result<bool> {
        let rows = self.sheets.get_values(HASH_RANGE).await?;
        Ok(rows
            .iter()
            .any(|row| row.first().is_some_and(|cell| cell == hash)))
    }

    async fn record(&self, hash: &str, message_ts: &str, emoji: Emoji) -> Result<()> {
        let row = vec![
            hash.to_string(),
            message_ts.to_string(),
            emoji.value().to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        ];
        self.sheets.append_row(APPEND_RANGE, row).await
    }

    async fn counts(&self, message_ts: &str) -> Result<EmojiCounts> {
        let rows = self.sheets.get_values(COUNT_RANGE).await?;
        Ok(count_rows(&rows, message_ts))
    }
}

fn count_rows(rows: &[Vec<String>], message_ts: &str) -> EmojiCounts {
    let mut counts = EmojiCounts::default();
    for row in rows {
        if let [_, ts, emoji, ..] = row.as_slice() {
            if ts == message_ts {
                if let Some(emoji) = Emoji::from_value(emoji) {
                    counts.add(emoji);
                }
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::auth::{CredentialSource, SHEETS_SCOPE};
    use crate::google::TokenProvider;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn store_for(server: &MockServer) -> SheetsReactionStore {
        let auth = Arc::new(TokenProvider::new(
            reqwest::Client::new(),
            CredentialSource::Static("token".to_string()),
            SHEETS_SCOPE,
        ));
        SheetsReactionStore::new(SheetsClient::new(
            reqwest::Client::new(),
            auth,
            "sheet",
            &server.uri(),
        ))
    }

    // ==================== Emoji Tests ====================

    #[test]
    fn test_emoji_action_ids_round_trip() {
        for emoji in Emoji::ALL {
            assert_eq!(Emoji::from_action_id(emoji.action_id()), Some(emoji));
        }
        assert_eq!(Emoji::from_action_id("bamboo_reply"), None);
    }

    #[test]
    fn test_count_rows_filters_by_message() {
        let rows = vec![
            vec!["h1".to_string(), "1.0".to_string(), "thumbsup".to_string()],
            vec!["h2".to_string(), "1.0".to_string(), "hug".to_string()],
            vec!["h3".to_string(), "2.0".to_string(), "hug".to_string()],
            vec!["h4".to_string(), "1.0".to_string(), "thumbsup".to_string()],
            vec!["h5".to_string(), "1.0".to_string(), "sparkles".to_string()],
            vec!["h6".to_string(), "1.0".to_string()],
        ];

        let counts = count_rows(&rows, "1.0");
        assert_eq!(
            counts,
            EmojiCounts {
                thumbs_up: 2,
                hug: 1,
                ..Default::default()
            }
        );
    }

    // ==================== Sheets Store Tests ====================

    #[tokio::test]
    async fn test_contains() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet/values/reactions!A:A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [["hash"], ["abc"], ["def"]]
            })))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        assert!(store.contains("abc").await.unwrap());
        assert!(!store.contains("xyz").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_appends_row() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet/values/reactions!A:D:append"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        store_for(&mock_server)
            .record("abc", "1.0", Emoji::Flex)
            .await
            .expect("Should record");

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let row = body["values"][0].as_array().unwrap();
        assert_eq!(row[0], "abc");
        assert_eq!(row[1], "1.0");
        assert_eq!(row[2], "flex");
        assert!(chrono::DateTime::parse_from_rfc3339(row[3].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_counts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet/values/reactions!A:C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [
                    ["a", "1.0", "thumbsdown"],
                    ["b", "1.0", "flex"],
                    ["c", "9.9", "flex"]
                ]
            })))
            .mount(&mock_server)
            .await;

        let counts = store_for(&mock_server).counts("1.0").await.unwrap();
        assert_eq!(counts.get(Emoji::ThumbsDown), 1);
        assert_eq!(counts.get(Emoji::Flex), 1);
        assert_eq!(counts.get(Emoji::ThumbsUp), 0);
    }

    #[tokio::test]
    async fn test_record_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        assert!(store_for(&mock_server)
            .record("abc", "1.0", Emoji::Hug)
            .await
            .is_err());
    }
}
