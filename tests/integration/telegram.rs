use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use perpsentry::models::alert::Alert;
use perpsentry::models::signal::{SignalDirection, TriggerRule};
use perpsentry::services::notifier::{AlertEmitter, DeliveryError, TelegramEmitter};

use crate::test_utils::base_time;

fn alert() -> Alert {
    Alert {
        instrument: "BTC".to_string(),
        direction: SignalDirection::Long,
        entry_price: 42000.0,
        take_profit: 43050.0,
        stop_loss: 41400.0,
        leverage: 10,
        rule: TriggerRule::TrendMomentum,
        rationale: "Advisory: higher lows".to_string(),
        issued_at: base_time(),
    }
}

fn emitter(server: &MockServer) -> TelegramEmitter {
    TelegramEmitter::with_client(server.uri(), "123:abc", "42", reqwest::Client::new())
}

#[tokio::test]
async fn test_send_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "42",
            "parse_mode": "Markdown",
            "disable_web_page_preview": true
        })))
        .and(body_string_contains("Entry: `42000.00`"))
        .and(body_string_contains("Take profit: `43050.00`"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(emitter(&server).send(&alert()).await);
}

#[tokio::test]
async fn test_notify_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({"text": "worker started"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(emitter(&server).notify("worker started").await);
}

#[tokio::test]
async fn test_rejected_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = assert_err!(emitter(&server).send(&alert()).await);
    assert!(
        matches!(err, DeliveryError::Rejected(ref description) if description.contains("chat not found"))
    );
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = assert_err!(emitter(&server).send(&alert()).await);
    assert!(matches!(err, DeliveryError::Status { status: 401, .. }));
}
