//! Integration tests for the Slack team bots
//!
//! These tests drive the HTTP routers end to end: signed Slack requests go
//! in, and the Slack and Google APIs are served by a mock server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use slack_team_bots::{
    bamboo::{self, BambooApp},
    config::{BambooConfig, ConfigSource, TranslateConfig},
    google::{auth::TRANSLATION_SCOPE, CredentialSource, GoogleTranslator, TokenProvider},
    security::{slack_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    slack::SlackClient,
    translate_bot::{self, TranslateBot},
};

const SIGNING_SECRET: &str = "test-signing-secret";

// ==================== Test Helpers ====================

fn translate_router(server: &MockServer) -> Router {
    let client = reqwest::Client::new();
    let auth = Arc::new(TokenProvider::new(
        client.clone(),
        CredentialSource::Static("gcp-token".to_string()),
        TRANSLATION_SCOPE,
    ));
    let translator = GoogleTranslator::new(client.clone(), auth, "proj", "global", &server.uri());
    let slack = SlackClient::new(client, "xoxb-test", &format!("{}/api", server.uri()));
    translate_bot::router(Arc::new(TranslateBot::new(slack, translator, SIGNING_SECRET)))
}

fn bamboo_router(server: &MockServer) -> Router {
    let slack = SlackClient::new(reqwest::Client::new(), "xoxb-test", &format!("{}/api", server.uri()));
    bamboo::router(Arc::new(BambooApp::new(slack, SIGNING_SECRET, "C_BAMBOO", None)))
}

/// Build a request signed the way Slack signs it
fn signed_request(uri: &str, content_type: &str, body: &str) -> Request<Body> {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = slack_signature(SIGNING_SECRET, &timestamp, body.as_bytes());

    Request::post(uri)
        .header("content-type", content_type)
        .header(TIMESTAMP_HEADER, timestamp)
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn message_event(text: &str) -> String {
    json!({
        "type": "event_callback",
        "team_id": "T1",
        "event": {
            "type": "message",
            "channel": "C1",
            "user": "U1",
            "text": text,
            "ts": "1700000000.000100"
        }
    })
    .to_string()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ==================== translate-bot Tests ====================

#[tokio::test]
async fn test_url_verification_echoes_challenge() {
    let mock_server = MockServer::start().await;
    let body = json!({"type": "url_verification", "challenge": "abc123"}).to_string();

    let response = translate_router(&mock_server)
        .oneshot(signed_request("/slack/events", "application/json", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(body_string(response).await, "abc123");
}

#[tokio::test]
async fn test_invalid_signature_is_rejected() {
    let mock_server = MockServer::start().await;
    let body = message_event("안녕하세요");

    let mut request = signed_request("/", "application/json", &body);
    request
        .headers_mut()
        .insert(SIGNATURE_HEADER, "v0=deadbeef".parse().unwrap());

    let response = translate_router(&mock_server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_slack_retries_are_acknowledged_without_work() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    // Retries are dropped before the signature is even checked
    let request = Request::post("/")
        .header("x-slack-retry-num", "1")
        .body(Body::from(message_event("안녕하세요")))
        .unwrap();

    let response = translate_router(&mock_server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unparseable_event_is_bad_request() {
    let mock_server = MockServer::start().await;

    let response = translate_router(&mock_server)
        .oneshot(signed_request("/", "application/json", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_japanese_message_is_translated_into_thread() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/projects/proj/locations/global:translateText"))
        .and(header("Authorization", "Bearer gcp-token"))
        .and(body_partial_json(json!({
            "contents": ["ランチは__CUR0__でした__LAU0__"],
            "targetLanguageCode": "ko"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": [{"translatedText": "점심은 __CUR0__였어요 __LAU0__"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(body_partial_json(json!({
            "channel": "C1",
            "text": "점심은 1,500엔였어요 ㅋㅋㅋ",
            "thread_ts": "1700000000.000100"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "ts": "2.0"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = translate_router(&mock_server)
        .oneshot(signed_request(
            "/",
            "application/json",
            &message_event("ランチは1,500円でしたwww"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_translation_failure_still_acknowledges_event() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/projects/proj/locations/global:translateText"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = translate_router(&mock_server)
        .oneshot(signed_request("/", "application/json", &message_event("안녕하세요")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock_server = MockServer::start().await;

    for router in [translate_router(&mock_server), bamboo_router(&mock_server)] {
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// ==================== bamboo-forest Tests ====================

#[tokio::test]
async fn test_bamboo_invalid_signature_reports_to_user() {
    let mock_server = MockServer::start().await;

    let request = Request::post("/")
        .header(TIMESTAMP_HEADER, chrono::Utc::now().timestamp().to_string())
        .header(SIGNATURE_HEADER, "v0=00")
        .body(Body::from("command=%2Fbamboo&trigger_id=t"))
        .unwrap();

    let response = bamboo_router(&mock_server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "⚠️ 인증에 실패했습니다.");
}

#[tokio::test]
async fn test_bamboo_slash_command_opens_modal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/views.open"))
        .and(body_partial_json(json!({
            "trigger_id": "trig-9",
            "view": {"callback_id": "bamboo_new_post"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = bamboo_router(&mock_server)
        .oneshot(signed_request(
            "/slack/bamboo",
            "application/x-www-form-urlencoded",
            "token=x&command=%2Fbamboo&text=&trigger_id=trig-9",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_bamboo_submission_posts_to_target_channel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(body_partial_json(json!({"channel": "C_BAMBOO"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "ts": "3.0"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = json!({
        "type": "view_submission",
        "user": {"id": "U1"},
        "view": {
            "callback_id": "bamboo_new_post",
            "state": {"values": {
                "category_block": {"category_input": {"selected_option": {"value": "question"}}},
                "message_block": {"message_input": {"value": "질문 있어요"}},
                "confirm_block": {"confirm_checkbox": {"selected_options": [{"value": "confirmed"}]}}
            }}
        }
    });
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", &payload.to_string())
        .finish();

    let response = bamboo_router(&mock_server)
        .oneshot(signed_request("/", "application/x-www-form-urlencoded", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ==================== Config Integration Tests ====================

#[test]
fn test_configs_from_secret_json() {
    let source = ConfigSource::from_secret_json(
        &json!({
            "SLACK_BOT_TOKEN": "xoxb-1",
            "SLACK_SIGNING_SECRET": "sig",
            "GOOGLE_CLOUD_PROJECT_ID": "proj-1",
            "GOOGLE_CREDS": {"type": "service_account"},
            "SHEETS_ID": "PLACEHOLDER",
            "PORT": "9000"
        })
        .to_string(),
    )
    .unwrap();

    let translate = TranslateConfig::from_source(&source).unwrap();
    assert_eq!(translate.google_cloud_project_id, "proj-1");
    assert_eq!(translate.port, 9000);
    assert!(translate.google_creds.unwrap().contains("service_account"));

    let bamboo = BambooConfig::from_source(&source).unwrap();
    assert_eq!(bamboo.slack.bot_token, "xoxb-1");
    assert!(bamboo.sheets_id.is_none());
    assert!(bamboo.reactions_settings().is_none());
}
