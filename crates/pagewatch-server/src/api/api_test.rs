use axum::body::{to_bytes, Body};
use axum::http::Request;
use pagewatch_notify::TelegramClient;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn app_with(client: TelegramClient, max_requests: usize) -> Router {
    let state = AppState {
        service: Arc::new(NotificationService::new(client)),
    };
    build_app(state, rate_limit_state(max_requests))
}

fn configured_app(server: &MockServer) -> Router {
    let client = TelegramClient::new(
        Some("123:test-token"),
        Some("987654"),
        &server.uri(),
        5,
        "pagewatch-test/0.1",
    )
    .expect("client");
    app_with(client, 60)
}

fn unconfigured_app() -> Router {
    let client = TelegramClient::new(None, None, "http://127.0.0.1:9", 1, "ua").expect("client");
    app_with(client, 60)
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn valid_event() -> serde_json::Value {
    json!({
        "ip": "203.0.113.7",
        "location": {"city": "Lisbon", "region": "Lisboa", "country": "Portugal"},
        "timestamp": "2024-03-05T14:07:09.000Z",
        "userAgent": "Mozilla/5.0"
    })
}

async fn mount_ack(server: &MockServer, ok: bool, calls: u64) {
    let body = if ok {
        json!({"ok": true, "result": {"message_id": 1}})
    } else {
        json!({"ok": false, "description": "bad token"})
    };
    Mock::given(method("POST"))
        .and(path("/bot123:test-token/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

#[test]
fn api_error_serializes_without_empty_fields() {
    let json = serde_json::to_value(ApiError::bad_request("IP address is required"))
        .expect("serialize");
    assert_eq!(json, json!({"success": false, "error": "IP address is required"}));
}

#[tokio::test]
async fn notify_accepts_valid_event() {
    let server = MockServer::start().await;
    mount_ack(&server, true, 1).await;

    let response = configured_app(&server)
        .oneshot(post_json("/api/notify", &valid_event()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(json_body(response).await, json!({"success": true}));
}

#[tokio::test]
async fn notify_rejects_missing_ip_without_dispatch() {
    let server = MockServer::start().await;
    mount_ack(&server, true, 0).await;

    let response = configured_app(&server)
        .oneshot(post_json("/api/notify", &json!({"location": {}})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "IP address is required"})
    );
}

#[tokio::test]
async fn notify_rejects_non_object_location() {
    let server = MockServer::start().await;
    mount_ack(&server, true, 0).await;

    let response = configured_app(&server)
        .oneshot(post_json(
            "/api/notify",
            &json!({"ip": "1.2.3.4", "location": "not-an-object"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Location data is required"
    );
}

#[tokio::test]
async fn notify_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/notify")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");

    let response = unconfigured_app().oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid JSON body");
}

#[tokio::test]
async fn notify_delivery_failure_is_500_without_cause() {
    let server = MockServer::start().await;
    mount_ack(&server, false, 1).await;

    let response = configured_app(&server)
        .oneshot(post_json("/api/notify", &valid_event()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(!body.to_string().contains("bad token"), "cause leaked: {body}");
}

#[tokio::test]
async fn notify_unconfigured_destination_is_500() {
    let response = unconfigured_app()
        .oneshot(post_json("/api/notify", &valid_event()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn notify_is_rate_limited() {
    let server = MockServer::start().await;
    mount_ack(&server, true, 1).await;
    let client = TelegramClient::new(
        Some("123:test-token"),
        Some("987654"),
        &server.uri(),
        5,
        "pagewatch-test/0.1",
    )
    .expect("client");
    let app = app_with(client, 1);

    let first = app
        .clone()
        .oneshot(post_json("/api/notify", &valid_event()))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post_json("/api/notify", &valid_event()))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(second).await["error"], "rate limit exceeded");
}

#[tokio::test]
async fn health_reports_configuration() {
    let server = MockServer::start().await;

    let configured = json_body(
        configured_app(&server)
            .oneshot(get("/api/health"))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(configured["status"], "online");
    assert_eq!(configured["service"], "Telegram Notification Server");
    assert_eq!(configured["configured"], true);
    assert!(configured["timestamp"].is_string());

    let unconfigured = json_body(
        unconfigured_app()
            .oneshot(get("/api/health"))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(unconfigured["configured"], false);
}

#[tokio::test]
async fn test_telegram_success() {
    let server = MockServer::start().await;
    mount_ack(&server, true, 1).await;

    let response = configured_app(&server)
        .oneshot(get("/api/test-telegram"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "message": "Test message sent to Telegram successfully!"})
    );
}

#[tokio::test]
async fn test_telegram_failure_includes_details_and_hint() {
    let server = MockServer::start().await;
    mount_ack(&server, false, 1).await;

    let response = configured_app(&server)
        .oneshot(get("/api/test-telegram"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "success": false,
            "error": "Failed to send test message",
            "details": "bad token",
            "hint": "Check your TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID"
        })
    );
}

#[tokio::test]
async fn unknown_route_lists_endpoints() {
    let response = unconfigured_app()
        .oneshot(get("/api/unknown"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({
            "success": false,
            "error": "Endpoint not found",
            "availableEndpoints": ["POST /api/notify", "GET /api/health", "GET /api/test-telegram"]
        })
    );
}

#[tokio::test]
async fn request_id_header_is_echoed() {
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "req-abc")
        .body(Body::empty())
        .expect("request");

    let response = unconfigured_app().oneshot(request).await.expect("response");

    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
}
