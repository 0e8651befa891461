use super::reactions::{Emoji, ReactionStore, SheetsReactionStore};
use super::views::{self, Category, Submission, Urgency};
use super::*;
use crate::config::BambooConfig;
use crate::google::auth::SHEETS_SCOPE;
use crate::google::{CredentialSource, SheetsClient, TokenProvider};
use crate::security::{reaction_hash, verify_slack_signature};
use crate::server;
use crate::slack::interaction::{BlockActions, InteractionPayload, ViewErrors, ViewSubmission};
use crate::slack::{MessageContent, SlackClient};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

const SLASH_COMMAND: &str = "/bamboo";

/// Plain-text reply Slack shows to the user who ran the command or clicked
fn slack_error(message: &str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("⚠️ {}", message),
    )
        .into_response()
}

/// Validation error displayed under an input block of the open modal
fn view_error(block_id: &str, message: &str) -> Response {
    Json(ViewErrors::single(block_id, message)).into_response()
}

fn ok() -> Response {
    StatusCode::OK.into_response()
}

pub struct BambooApp {
    slack: SlackClient,
    signing_secret: String,
    target_channel_id: String,
    reactions: Option<Arc<dyn ReactionStore>>,
}

impl BambooApp {
    pub fn new(
        slack: SlackClient,
        signing_secret: &str,
        target_channel_id: &str,
        reactions: Option<Arc<dyn ReactionStore>>,
    ) -> Self {
        Self {
            slack,
            signing_secret: signing_secret.to_string(),
            target_channel_id: target_channel_id.to_string(),
            reactions,
        }
    }

    /// Build clients from configuration.
    ///
    /// Reactions are disabled, with a warning, when their settings are
    /// missing or the credentials cannot be parsed.
    pub fn from_config(config: &BambooConfig) -> Self {
        let client = reqwest::Client::new();
        let slack = SlackClient::new(
            client.clone(),
            &config.slack.bot_token,
            &config.slack.api_url,
        );

        let reactions: Option<Arc<dyn ReactionStore>> = match config.reactions_settings() {
            Some((creds, sheets_id)) => match CredentialSource::from_json(creds) {
                Ok(source) => {
                    let auth = Arc::new(TokenProvider::new(client.clone(), source, SHEETS_SCOPE));
                    let sheets =
                        SheetsClient::new(client, auth, sheets_id, &config.sheets_api_url);
                    info!("Anonymous reactions enabled (sheets_id={})", sheets_id);
                    Some(Arc::new(SheetsReactionStore::new(sheets)))
                }
                Err(e) => {
                    warn!("Invalid Google credentials, reactions disabled: {:#}", e);
                    None
                }
            },
            None => {
                info!("Google Sheets not configured, reactions disabled");
                None
            }
        };

        Self::new(
            slack,
            &config.slack.signing_secret,
            &config.target_channel_id,
            reactions,
        )
    }

    /// Dispatch a verified, form-encoded request body
    pub async fn handle_form(&self, body: &[u8]) -> Response {
        let form: HashMap<String, String> = url::form_urlencoded::parse(body).into_owned().collect();

        if form.get("command").map(String::as_str) == Some(SLASH_COMMAND) {
            info!("Handling slash command");
            return self.handle_slash_command(&form).await;
        }

        if let Some(payload) = form.get("payload") {
            info!("Handling interaction");
            return self.handle_interaction(payload).await;
        }

        info!("Ignoring unknown request ({} form fields)", form.len());
        ok()
    }

    async fn handle_slash_command(&self, form: &HashMap<String, String>) -> Response {
        let Some(trigger_id) = form.get("trigger_id").filter(|id| !id.is_empty()) else {
            error!("Slash command without trigger_id");
            return slack_error("요청 정보가 부족합니다.");
        };

        if let Err(e) = self.slack.open_view(trigger_id, &views::new_post_modal()).await {
            error!("Failed to open new post modal: {:#}", e);
            return slack_error("모달을 열 수 없습니다. 잠시 후 다시 시도해주세요.");
        }

        info!("✓ Opened new post modal");
        ok()
    }

    async fn handle_interaction(&self, payload: &str) -> Response {
        let payload: InteractionPayload = match serde_json::from_str(payload) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to parse interaction payload: {}", e);
                return slack_error("요청을 처리할 수 없습니다.");
            }
        };

        match payload {
            InteractionPayload::ViewSubmission(submission) => {
                self.handle_view_submission(&submission).await
            }
            InteractionPayload::BlockActions(actions) => self.handle_block_actions(&actions).await,
            InteractionPayload::Other => {
                info!("Ignoring unsupported interaction type");
                ok()
            }
        }
    }

    async fn handle_view_submission(&self, submission: &ViewSubmission) -> Response {
        let view = &submission.view;
        let state = &view.state;

        let message = state.text(BLOCK_MESSAGE, ACTION_MESSAGE);
        if message.is_empty() {
            return view_error(BLOCK_MESSAGE, "메시지를 입력해주세요");
        }

        if !state.is_checked(BLOCK_CONFIRM, ACTION_CONFIRM) {
            return view_error(BLOCK_CONFIRM, "확인 체크박스를 선택해주세요");
        }

        let post = Submission {
            message: message.to_string(),
            nickname: state.text(BLOCK_NAME, ACTION_NAME).to_string(),
            mentions: state.selected_users(BLOCK_MENTION, ACTION_MENTION).to_vec(),
        };

        match view.callback_id.as_str() {
            CALLBACK_NEW_POST => {
                let Some(category) = state
                    .selected(BLOCK_CATEGORY, ACTION_CATEGORY)
                    .and_then(Category::from_value)
                else {
                    return view_error(BLOCK_CATEGORY, "카테고리를 선택해주세요");
                };
                let urgency = state
                    .selected(BLOCK_URGENCY, ACTION_URGENCY)
                    .and_then(Urgency::from_value)
                    .unwrap_or_default();

                self.post_new_message(&post, category, urgency).await
            }
            CALLBACK_NEW_THREAD => self.post_thread_reply(&view.private_metadata, &post).await,
            other => {
                info!("Ignoring view submission (callback_id={})", other);
                ok()
            }
        }
    }

    async fn post_new_message(
        &self,
        post: &Submission,
        category: Category,
        urgency: Urgency,
    ) -> Response {
        let blocks = views::new_post_blocks(post, category, urgency);

        if let Err(e) = self
            .slack
            .post_message(&self.target_channel_id, MessageContent::Blocks(&blocks), None)
            .await
        {
            error!("Failed to post anonymous message: {:#}", e);
            return view_error(
                BLOCK_MESSAGE,
                "메시지 게시에 실패했습니다. 잠시 후 다시 시도해주세요.",
            );
        }

        info!(
            "✓ Posted anonymous message (category={}, urgency={})",
            category.value(),
            urgency.value()
        );
        ok()
    }

    async fn post_thread_reply(&self, metadata: &str, post: &Submission) -> Response {
        let Some((channel_id, thread_ts)) = views::parse_thread_metadata(metadata) else {
            warn!("Malformed thread metadata: {:?}", metadata);
            return view_error(BLOCK_MESSAGE, "잘못된 요청입니다");
        };

        let blocks = views::thread_reply_blocks(post);

        if let Err(e) = self
            .slack
            .post_message(channel_id, MessageContent::Blocks(&blocks), Some(thread_ts))
            .await
        {
            error!("Failed to post anonymous thread reply: {:#}", e);
            return view_error(
                BLOCK_MESSAGE,
                "답글 게시에 실패했습니다. 잠시 후 다시 시도해주세요.",
            );
        }

        info!(
            "✓ Posted anonymous thread reply (channel={}, thread={})",
            channel_id, thread_ts
        );
        ok()
    }

    async fn handle_block_actions(&self, payload: &BlockActions) -> Response {
        let channel_id = payload.channel.id.as_str();
        let message = &payload.message;

        for action in &payload.actions {
            match action.action_id.as_str() {
                ACTION_REPLY => {
                    let thread_ts = message.thread_root();
                    let modal = views::thread_modal(channel_id, thread_ts);

                    if let Err(e) = self.slack.open_view(&payload.trigger_id, &modal).await {
                        error!("Failed to open thread modal: {:#}", e);
                        return slack_error("답글 모달을 열 수 없습니다. 잠시 후 다시 시도해주세요.");
                    }
                    info!(
                        "✓ Opened thread modal (channel={}, thread={})",
                        channel_id, thread_ts
                    );
                }
                ACTION_COMPLETE => {
                    let blocks = views::mark_completed(&message.blocks, &payload.user.id);

                    if let Err(e) = self
                        .slack
                        .update_message(channel_id, &message.ts, &blocks)
                        .await
                    {
                        error!("Failed to mark message as handled: {:#}", e);
                        return slack_error("처리완료 표시에 실패했습니다. 잠시 후 다시 시도해주세요.");
                    }
                    info!(
                        "✓ Marked message as handled (channel={}, ts={})",
                        channel_id, message.ts
                    );
                }
                other => {
                    if let Some(emoji) = Emoji::from_action_id(other) {
                        return self.handle_emoji_reaction(payload, emoji).await;
                    }
                }
            }
        }

        ok()
    }

    async fn handle_emoji_reaction(&self, payload: &BlockActions, emoji: Emoji) -> Response {
        let Some(store) = &self.reactions else {
            info!("Reactions disabled, ignoring {}", emoji);
            return ok();
        };

        let channel_id = payload.channel.id.as_str();
        let message_ts = payload.message.ts.as_str();
        let hash = reaction_hash(&payload.user.id, message_ts, emoji.value());

        match store.contains(&hash).await {
            Ok(true) => {
                info!("Ignoring duplicate reaction (emoji={}, ts={})", emoji, message_ts);
                return ok();
            }
            Ok(false) => {}
            // Reactions still go through when the lookup fails
            Err(e) => warn!("Duplicate check failed: {:#}", e),
        }

        if let Err(e) = store.record(&hash, message_ts, emoji).await {
            error!("Failed to record reaction: {:#}", e);
            return slack_error("리액션 저장에 실패했습니다.");
        }

        let counts = store.counts(message_ts).await.unwrap_or_else(|e| {
            warn!("Failed to count reactions: {:#}", e);
            Default::default()
        });

        let blocks = views::with_emoji_counts(&payload.message.blocks, &counts);
        if let Err(e) = self
            .slack
            .update_message(channel_id, message_ts, &blocks)
            .await
        {
            error!("Failed to update reaction counts: {:#}", e);
            return slack_error("리액션 업데이트에 실패했습니다.");
        }

        info!("✓ Recorded reaction (emoji={}, ts={})", emoji, message_ts);
        ok()
    }
}

/// Router for slash commands and interactivity
pub fn router(app: Arc<BambooApp>) -> Router {
    Router::new()
        .route("/", post(handle_request))
        .route("/slack/bamboo", post(handle_request))
        .with_state(app)
        .merge(server::health_routes())
}

async fn handle_request(
    State(app): State<Arc<BambooApp>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = verify_slack_signature(
        &headers,
        &body,
        &app.signing_secret,
        Utc::now().timestamp(),
    ) {
        warn!("Signature verification failed: {}", e);
        return slack_error("인증에 실패했습니다.");
    }

    app.handle_form(&body).await
}
