//! Individual links of the lookup chain.
//!
//! Each provider makes exactly one GET request and either yields a complete
//! [`VisitorLocationInfo`] or a [`GeoError`]. Ordering and fallback live in
//! [`GeoLookupClient`](crate::GeoLookupClient).

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GeoError;
use crate::types::{LookupSource, VisitorLocationInfo};

const IPAPI_BASE_URL: &str = "https://ipapi.co/";
const IPIFY_BASE_URL: &str = "https://api.ipify.org/";

/// A geolocation capability. `Ipapi` resolves IP and location in one call;
/// `Ipify` resolves the IP only.
#[derive(Debug, Clone)]
pub enum GeoProvider {
    Ipapi { base_url: Url },
    Ipify { base_url: Url },
}

#[derive(Debug, Deserialize)]
struct IpapiResponse {
    ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpifyResponse {
    ip: Option<String>,
}

impl GeoProvider {
    /// The production combined IP + location provider.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if the built-in URL fails to parse.
    pub fn ipapi() -> Result<Self, GeoError> {
        Self::ipapi_at(IPAPI_BASE_URL)
    }

    /// The production IP-only provider.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if the built-in URL fails to parse.
    pub fn ipify() -> Result<Self, GeoError> {
        Self::ipify_at(IPIFY_BASE_URL)
    }

    /// `Ipapi` provider pointed at a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn ipapi_at(base_url: &str) -> Result<Self, GeoError> {
        Ok(Self::Ipapi {
            base_url: normalise_base_url(base_url)?,
        })
    }

    /// `Ipify` provider pointed at a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn ipify_at(base_url: &str) -> Result<Self, GeoError> {
        Ok(Self::Ipify {
            base_url: normalise_base_url(base_url)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ipapi { .. } => "ipapi",
            Self::Ipify { .. } => "ipify",
        }
    }

    fn request_url(&self) -> Url {
        match self {
            Self::Ipapi { base_url } => {
                let mut url = base_url.clone();
                url.set_path(&format!("{}json/", base_url.path()));
                url
            }
            Self::Ipify { base_url } => {
                let mut url = base_url.clone();
                url.query_pairs_mut().append_pair("format", "json");
                url
            }
        }
    }

    /// Performs the single lookup request for this provider.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-2xx status, malformed body, provider-level
    /// error flag, or missing `ip` is reported as a [`GeoError`].
    pub async fn lookup(&self, client: &Client) -> Result<VisitorLocationInfo, GeoError> {
        let provider = self.name();
        let response = client.get(self.request_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UnexpectedStatus {
                provider,
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;

        match self {
            Self::Ipapi { .. } => {
                let parsed: IpapiResponse = serde_json::from_str(&body)
                    .map_err(|source| GeoError::Deserialize { provider, source })?;
                if parsed.error {
                    return Err(GeoError::Provider {
                        provider,
                        reason: parsed.reason.unwrap_or_else(|| "unknown error".to_string()),
                    });
                }
                let ip = non_empty_ip(parsed.ip, provider)?;
                Ok(VisitorLocationInfo::new(
                    ip,
                    parsed.city,
                    parsed.region,
                    parsed.country_name,
                    LookupSource::Ipapi,
                ))
            }
            Self::Ipify { .. } => {
                let parsed: IpifyResponse = serde_json::from_str(&body)
                    .map_err(|source| GeoError::Deserialize { provider, source })?;
                let ip = non_empty_ip(parsed.ip, provider)?;
                Ok(VisitorLocationInfo::new(
                    ip,
                    None,
                    None,
                    None,
                    LookupSource::Ipify,
                ))
            }
        }
    }
}

fn non_empty_ip(ip: Option<String>, provider: &'static str) -> Result<String, GeoError> {
    ip.map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .ok_or(GeoError::MissingIp { provider })
}

/// Ensures the base URL ends with exactly one slash so that path joins
/// append rather than replace the last segment.
fn normalise_base_url(base_url: &str) -> Result<Url, GeoError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}
