use thiserror::Error;

/// Errors returned by the messaging dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No real bot token / chat id was supplied; nothing was sent.
    #[error("messaging destination not configured")]
    NotConfigured,

    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a body that is not its JSON envelope.
    #[error("malformed response from messaging endpoint: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The endpoint answered `"ok": false`. Displays as the endpoint's own
    /// description, e.g. `bad token`.
    #[error("{description}")]
    Rejected { description: String },
}
