pub mod app_config;
pub mod config;
pub mod visitor;

pub use app_config::{AppConfig, Environment};
pub use config::{
    build_config, load_app_config, load_app_config_from_env, load_app_config_with,
    CredentialPolicy,
};
pub use visitor::{NotificationOutcome, VisitorEvent, VisitorLocation};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
