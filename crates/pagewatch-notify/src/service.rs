//! HTTP-independent handling of one inbound visitor event.

use chrono::{DateTime, Utc};
use pagewatch_core::{NotificationOutcome, VisitorEvent, VisitorLocation};
use serde_json::Value;

use crate::dispatch::{SendReceipt, TelegramClient};
use crate::error::DispatchError;
use crate::format::format_notification;

pub const MISSING_IP: &str = "missing ip";
pub const MISSING_LOCATION: &str = "missing location";
pub const TEST_MESSAGE: &str = "✅ Test message: Server is connected and working!";

const UNKNOWN_USER_AGENT: &str = "unknown";
const LOGGED_USER_AGENT_CHARS: usize = 50;

/// Validates, formats and dispatches visitor events.
///
/// Stateless across requests: every call to [`NotificationService::handle`]
/// is an independent, at-most-once pipeline.
pub struct NotificationService {
    dispatcher: TelegramClient,
}

impl NotificationService {
    #[must_use]
    pub fn new(dispatcher: TelegramClient) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.dispatcher.is_configured()
    }

    /// Processes one raw payload.
    ///
    /// Validation happens before any outbound call: a payload without an
    /// `ip`, or whose `location` is not an object, is rejected without
    /// touching the dispatcher. Delivery causes are returned for logging and
    /// must not be echoed to the visitor.
    pub async fn handle(&self, raw: &Value) -> NotificationOutcome {
        let event = match validate(raw, Utc::now()) {
            Ok(event) => event,
            Err(reason) => {
                tracing::warn!(reason, "visitor event rejected");
                return NotificationOutcome::RejectedInvalid(reason.to_string());
            }
        };

        let user_agent: String = event
            .user_agent
            .chars()
            .take(LOGGED_USER_AGENT_CHARS)
            .collect();
        tracing::info!(
            ip = %event.ip,
            city = event.location.city.as_deref().unwrap_or("-"),
            region = event.location.region.as_deref().unwrap_or("-"),
            country = event.location.country.as_deref().unwrap_or("-"),
            time = %event.timestamp,
            device = %user_agent,
            "new access detected"
        );

        let message = format_notification(&event);
        match self.dispatcher.send(&message).await {
            Ok(receipt) => {
                tracing::info!(ip = %event.ip, message_id = ?receipt.message_id, "notification delivered");
                NotificationOutcome::Accepted
            }
            Err(e) => {
                tracing::error!(ip = %event.ip, error = %e, "notification delivery failed");
                NotificationOutcome::DeliveryFailed(e.to_string())
            }
        }
    }

    /// Sends the fixed connectivity test message.
    ///
    /// # Errors
    ///
    /// Propagates the dispatcher's [`DispatchError`].
    pub async fn send_test_message(&self) -> Result<SendReceipt, DispatchError> {
        self.dispatcher.send(TEST_MESSAGE).await
    }
}

/// Builds a [`VisitorEvent`] from a raw payload or names the first missing
/// required field.
///
/// `timestamp` falls back to `received_at` when absent or not RFC 3339;
/// `userAgent` falls back to `"unknown"`.
///
/// # Errors
///
/// Returns [`MISSING_IP`] when `ip` is absent, blank or not a string, then
/// [`MISSING_LOCATION`] when `location` is absent or not a JSON object.
pub fn validate(raw: &Value, received_at: DateTime<Utc>) -> Result<VisitorEvent, &'static str> {
    let ip = raw
        .get("ip")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .ok_or(MISSING_IP)?;

    let location = raw
        .get("location")
        .and_then(Value::as_object)
        .map(VisitorLocation::from_json_object)
        .ok_or(MISSING_LOCATION)?;

    let timestamp = raw
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map_or(received_at, |ts| ts.with_timezone(&Utc));

    let user_agent = raw
        .get("userAgent")
        .and_then(Value::as_str)
        .filter(|ua| !ua.trim().is_empty())
        .unwrap_or(UNKNOWN_USER_AGENT)
        .to_string();

    Ok(VisitorEvent {
        ip: ip.to_string(),
        location,
        timestamp,
        user_agent,
    })
}
