//! Visitor-event records and the per-request notification outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse location of a visitor. Every field is optional; lookups that only
/// resolve an IP leave them empty or fill them with a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl VisitorLocation {
    /// Builds a location from a loosely-typed JSON object, keeping only the
    /// string-valued `city`, `region` and `country` keys.
    #[must_use]
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let field = |key: &str| {
            object
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        Self {
            city: field("city"),
            region: field("region"),
            country: field("country"),
        }
    }
}

/// One page load's observed network identity and device metadata.
///
/// Constructed once the client-side lookup settles and never mutated
/// afterwards. Serializes with the camelCase keys the browser sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorEvent {
    pub ip: String,
    pub location: VisitorLocation,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
}

/// Business result of processing one visitor event, independent of HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Accepted,
    RejectedInvalid(String),
    DeliveryFailed(String),
}

impl NotificationOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}
