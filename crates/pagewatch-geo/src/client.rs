//! Ordered lookup chain over [`GeoProvider`]s.

use std::time::Duration;

use reqwest::Client;

use crate::error::GeoError;
use crate::provider::GeoProvider;
use crate::types::VisitorLocationInfo;

/// Resolves the visitor's public IP and coarse location.
///
/// Providers are tried in order, each at most once; the first success wins.
/// When every provider fails, [`VisitorLocationInfo::placeholder`] is
/// returned. [`GeoLookupClient::resolve`] therefore never fails.
pub struct GeoLookupClient {
    client: Client,
    providers: Vec<GeoProvider>,
}

impl GeoLookupClient {
    /// Creates a client using the production chain: combined IP + location
    /// lookup first, IP-only lookup second.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        Self::with_providers(
            timeout_secs,
            user_agent,
            vec![GeoProvider::ipapi()?, GeoProvider::ipify()?],
        )
    }

    /// Creates a client with an explicit provider chain (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn with_providers(
        timeout_secs: u64,
        user_agent: &str,
        providers: Vec<GeoProvider>,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, providers })
    }

    #[must_use]
    pub fn providers(&self) -> &[GeoProvider] {
        &self.providers
    }

    /// Walks the provider chain and returns the first successful result, or
    /// a synthesised placeholder once the chain is exhausted.
    pub async fn resolve(&self) -> VisitorLocationInfo {
        for provider in &self.providers {
            match provider.lookup(&self.client).await {
                Ok(info) => {
                    tracing::debug!(provider = provider.name(), ip = %info.ip, "geolocation resolved");
                    return info;
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "geolocation provider failed");
                }
            }
        }

        let placeholder = VisitorLocationInfo::placeholder();
        tracing::warn!(ip = %placeholder.ip, "all geolocation providers failed, using placeholder");
        placeholder
    }
}
