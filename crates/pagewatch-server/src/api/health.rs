use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ApiError, AppState, SuccessBody};
use crate::middleware::RequestId;

const SERVICE_NAME: &str = "Telegram Notification Server";
const TEST_FAILED_HINT: &str = "Check your TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct HealthData {
    status: &'static str,
    timestamp: DateTime<Utc>,
    service: &'static str,
    configured: bool,
}

pub(super) async fn health(State(state): State<AppState>) -> Json<HealthData> {
    Json(HealthData {
        status: "online",
        timestamp: Utc::now(),
        service: SERVICE_NAME,
        configured: state.service.is_configured(),
    })
}

/// `GET /api/test-telegram`: sends the fixed test message. Unlike
/// `/api/notify`, failures echo the cause so the operator can debug setup.
pub(super) async fn test_telegram(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<SuccessBody>, ApiError> {
    match state.service.send_test_message().await {
        Ok(_) => Ok(Json(SuccessBody::new(Some(
            "Test message sent to Telegram successfully!",
        )))),
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "test message failed");
            Err(ApiError::internal("Failed to send test message")
                .with_details(e.to_string(), TEST_FAILED_HINT))
        }
    }
}
