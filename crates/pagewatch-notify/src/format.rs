//! Alert text for the operator's messaging channel.

use chrono::{DateTime, Utc};
use pagewatch_core::VisitorEvent;

/// Rendered in place of a missing `location.country`.
pub const COUNTRY_PLACEHOLDER: &str = "unknown";

/// Formats a visitor event as an HTML-mode alert message.
///
/// Pure: the output depends only on `event`. Only the country is rendered
/// from the location; city and region are accepted but left out.
#[must_use]
pub fn format_notification(event: &VisitorEvent) -> String {
    let country = event
        .location
        .country
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(COUNTRY_PLACEHOLDER);

    format!(
        "🚨 <b>NEW VISITOR ALERT</b> 🚨\n\
         \n\
         📍 <b>IP Address:</b> <code>{ip}</code>\n\
         \n\
         🌍 <b>Location Details:</b> ✅ Tracked\n   \
         • Country: {country}\n\
         \n\
         🕐 <b>Timestamp:</b> {timestamp}\n\
         \n\
         💻 <b>Device Info:</b>\n\
         <code>{user_agent}</code>\n\
         \n\
         ⚡ <i>Link accessed successfully</i>",
        ip = event.ip,
        timestamp = format_timestamp(event.timestamp),
        user_agent = event.user_agent,
    )
}

/// Long-form UTC rendering, e.g. `Tuesday, March 5, 2024 at 2:07:09 PM UTC`.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .format("%A, %B %-d, %Y at %-I:%M:%S %p UTC")
        .to_string()
}
