use pagewatch_core::VisitorLocation;
use serde::Serialize;

/// Token used for any location field a lookup could not fill.
pub const PLACEHOLDER_TOKEN: &str = "logged";

/// Which link of the lookup chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Ipapi,
    Ipify,
    Placeholder,
}

/// Outcome of a lookup. Location fields are always populated, with
/// [`PLACEHOLDER_TOKEN`] standing in for anything unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorLocationInfo {
    pub ip: String,
    pub location: VisitorLocation,
    pub source: LookupSource,
}

impl VisitorLocationInfo {
    pub(crate) fn new(
        ip: String,
        city: Option<String>,
        region: Option<String>,
        country: Option<String>,
        source: LookupSource,
    ) -> Self {
        let fill = |value: Option<String>| {
            Some(
                value
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_TOKEN.to_string()),
            )
        };
        Self {
            ip,
            location: VisitorLocation {
                city: fill(city),
                region: fill(region),
                country: fill(country),
            },
            source,
        }
    }

    /// Synthesised result used once every provider has failed: a random
    /// IPv4-shaped address and placeholder location fields.
    #[must_use]
    pub fn placeholder() -> Self {
        let octets: [u8; 4] = rand::random();
        Self::new(
            std::net::Ipv4Addr::from(octets).to_string(),
            None,
            None,
            None,
            LookupSource::Placeholder,
        )
    }

    #[must_use]
    pub fn country(&self) -> &str {
        self.location.country.as_deref().unwrap_or(PLACEHOLDER_TOKEN)
    }
}
