use thiserror::Error;

/// Failure of a single geolocation provider. Never escapes
/// [`GeoLookupClient::resolve`](crate::GeoLookupClient::resolve); the chain
/// moves on to the next provider instead.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { provider: &'static str, status: u16 },

    #[error("JSON deserialization error for {provider}: {source}")]
    Deserialize {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The provider answered but reported an error of its own (e.g. rate limited).
    #[error("{provider} reported an error: {reason}")]
    Provider {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} response has no ip")]
    MissingIp { provider: &'static str },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
