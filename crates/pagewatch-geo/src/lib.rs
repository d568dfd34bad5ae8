//! Best-effort resolution of a visitor's public IP and coarse location.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::GeoLookupClient;
pub use error::GeoError;
pub use provider::GeoProvider;
pub use types::{LookupSource, VisitorLocationInfo, PLACEHOLDER_TOKEN};
