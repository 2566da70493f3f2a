//! Update Handler Tests
//!
//! Raw update payloads through the engine to a delivery channel, including the
//! Telegram channel against a mock Bot API.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::FixedWeather;
use crate::brain::rules::WEATHER_MISSING_CREDENTIALS;
use crate::brain::ReplyEngine;
use crate::config::{Settings, TelegramSettings};
use crate::error::AppError;
use crate::handler::UpdateHandler;
use crate::models::OutboundMessage;
use crate::services::traits::DeliveryChannel;
use crate::services::weather::WeatherOutcome;
use crate::services::TelegramChannel;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Records every delivered message
#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Fails every delivery
struct BrokenChannel;

#[async_trait]
impl DeliveryChannel for BrokenChannel {
    async fn deliver(&self, _message: &OutboundMessage) -> Result<(), AppError> {
        Err(AppError::Http("connection reset".to_string()))
    }
}

fn engine() -> Arc<ReplyEngine> {
    Arc::new(
        ReplyEngine::new(
            &Settings::default(),
            Arc::new(FixedWeather(WeatherOutcome::MissingCredentials)),
        )
        .unwrap(),
    )
}

fn update(text: &str) -> Vec<u8> {
    json!({
        "update_id": 900,
        "message": {
            "message_id": 77,
            "chat": {"id": -4242, "type": "group"},
            "from": {"id": 5, "first_name": "Макс", "is_bot": false},
            "date": 1_700_000_000,
            "text": text
        }
    })
    .to_string()
    .into_bytes()
}

fn telegram_settings(server: &MockServer) -> TelegramSettings {
    TelegramSettings {
        bot_token: Some("123:abc".to_string()),
        api_base: server.uri(),
    }
}

// ============================================================================
// Handler
// ============================================================================

#[tokio::test]
async fn test_addressed_update_is_answered_in_the_same_chat() {
    let channel = Arc::new(RecordingChannel::default());
    let handler = UpdateHandler::new(engine(), channel.clone());

    let outbound = handler
        .handle(&update("Нері, яка погода в Києві?"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outbound.chat_id, -4242);
    assert_eq!(outbound.reply_to_message_id, Some(77));
    assert_eq!(outbound.text, WEATHER_MISSING_CREDENTIALS);
    assert_eq!(channel.sent(), vec![outbound]);
}

#[tokio::test]
async fn test_unaddressed_and_textless_updates_are_ignored() {
    let channel = Arc::new(RecordingChannel::default());
    let handler = UpdateHandler::new(engine(), channel.clone());

    assert!(handler.handle(&update("яка погода в Києві?")).await.unwrap().is_none());

    let sticker = json!({
        "update_id": 901,
        "message": {"message_id": 78, "chat": {"id": 1}, "sticker": {"emoji": "😺"}}
    });
    assert!(handler.handle(sticker.to_string().as_bytes()).await.unwrap().is_none());

    let service = json!({"update_id": 902, "my_chat_member": {}});
    assert!(handler.handle(service.to_string().as_bytes()).await.unwrap().is_none());

    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_an_error() {
    let handler = UpdateHandler::new(engine(), Arc::new(RecordingChannel::default()));
    let err = handler.handle(b"{not json").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_delivery_failure_is_logged_and_dropped() {
    let handler = UpdateHandler::new(engine(), Arc::new(BrokenChannel));
    let outbound = handler.handle(&update("/help")).await.unwrap();
    assert!(outbound.is_some());
}

// ============================================================================
// Telegram channel
// ============================================================================

#[tokio::test]
async fn test_telegram_channel_posts_send_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(json!({"chat_id": 42, "text": "Мяу", "reply_to_message_id": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let channel = TelegramChannel::new(&telegram_settings(&server), Duration::from_secs(5)).unwrap();
    let message = OutboundMessage {
        chat_id: 42,
        text: "Мяу".to_string(),
        reply_to_message_id: Some(7),
    };
    channel.deliver(&message).await.unwrap();
}

#[tokio::test]
async fn test_telegram_channel_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(json!({"chat_id": 1, "text": "403"})))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"ok": false, "description": "Forbidden"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(json!({"chat_id": 1, "text": "not ok"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false, "description": "Bad Request"})))
        .mount(&server)
        .await;

    let channel = TelegramChannel::new(&telegram_settings(&server), Duration::from_secs(5)).unwrap();
    let outbound = |text: &str| OutboundMessage {
        chat_id: 1,
        text: text.to_string(),
        reply_to_message_id: None,
    };

    let err = channel.deliver(&outbound("403")).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: 403, .. }));

    let err = channel.deliver(&outbound("not ok")).await.unwrap_err();
    assert!(matches!(err, AppError::Delivery(ref d) if d == "Bad Request"));

    // empty text never leaves the process
    let err = channel.deliver(&outbound("")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_start_command_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let channel = TelegramChannel::new(&telegram_settings(&server), Duration::from_secs(5)).unwrap();
    let handler = UpdateHandler::new(engine(), Arc::new(channel));
    let outbound = handler.handle(&update("/start@neri_bot")).await.unwrap().unwrap();
    assert!(outbound.text.starts_with("Я Нері"));
}
