//! HTTP client for the Telegram Bot API `sendMessage` endpoint.
//!
//! Success is decided by the `"ok"` flag of the response envelope, never by
//! the HTTP status alone: Telegram answers most failures with a 4xx status
//! *and* an `ok: false` envelope, and an envelope with `ok: false` under a
//! 200 is a failure as well.

use std::time::Duration;

use pagewatch_core::AppConfig;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Resolved destination. The bot token only lives inside `send_url`.
struct Destination {
    send_url: Url,
    chat_id: String,
}

/// Sends formatted alerts to one fixed chat.
///
/// Each [`TelegramClient::send`] call makes exactly one request; there is
/// no retry or queueing.
pub struct TelegramClient {
    client: Client,
    destination: Option<Destination>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Acknowledgement of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<i64>,
}

impl TelegramClient {
    /// Builds a client from application config. Placeholder or missing
    /// credentials leave the client unconfigured; sends then fail with
    /// [`DispatchError::NotConfigured`] without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, DispatchError> {
        let (token, chat_id) = if config.is_configured() {
            (
                config.telegram_bot_token.as_deref(),
                config.telegram_chat_id.as_deref(),
            )
        } else {
            (None, None)
        };
        Self::new(
            token,
            chat_id,
            &config.telegram_api_base,
            config.dispatch_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client against `api_base` (the production Bot API host, or a
    /// mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Http`] if the `reqwest::Client` cannot be
    /// constructed. An unparsable `api_base` leaves the client unconfigured.
    pub fn new(
        bot_token: Option<&str>,
        chat_id: Option<&str>,
        api_base: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        let destination = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => match send_message_url(api_base, bot_token) {
                Some(send_url) => Some(Destination {
                    send_url,
                    chat_id: chat_id.to_owned(),
                }),
                None => {
                    tracing::error!(api_base, "invalid messaging API base URL");
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            client,
            destination,
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.destination.is_some()
    }

    /// Sends `message` to the configured chat with HTML parse mode.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotConfigured`] if no credentials are set.
    /// - [`DispatchError::Http`] on transport failure or timeout.
    /// - [`DispatchError::Deserialize`] if the body is not the JSON envelope.
    /// - [`DispatchError::Rejected`] if the envelope says `ok: false`.
    pub async fn send(&self, message: &str) -> Result<SendReceipt, DispatchError> {
        let Some(destination) = &self.destination else {
            return Err(DispatchError::NotConfigured);
        };

        // Errors are stripped of their URL so the bot token never reaches logs.
        let response = self
            .client
            .post(destination.send_url.clone())
            .json(&SendMessageRequest {
                chat_id: &destination.chat_id,
                text: message,
                parse_mode: "HTML",
            })
            .send()
            .await
            .map_err(|e| DispatchError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::Http(e.without_url()))?;
        let envelope: SendMessageResponse =
            serde_json::from_str(&body).map_err(DispatchError::Deserialize)?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("request rejected with HTTP {}", status.as_u16()));
            return Err(DispatchError::Rejected { description });
        }

        Ok(SendReceipt {
            message_id: envelope.result.map(|m| m.message_id),
        })
    }
}

/// `{api_base}/bot{token}/sendMessage`, tolerating a trailing slash on the base.
fn send_message_url(api_base: &str, bot_token: &str) -> Option<Url> {
    // Built as a string rather than via `Url::join`: tokens contain ':' and
    // would otherwise parse as a scheme.
    let base = api_base.trim_end_matches('/');
    Url::parse(&format!("{base}/bot{bot_token}/sendMessage")).ok()
}
