use std::fmt;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Whether a missing Telegram token or chat id is a load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Server and dispatch tooling: credentials are mandatory outside
    /// development.
    RequiredOutsideDevelopment,
    /// Visitor-side tooling never dispatches and loads without them.
    Optional,
}

/// Reads `.env` (if any) and then the process environment.
///
/// # Errors
///
/// Returns `ConfigError` when a numeric or address variable does not parse,
/// or when Telegram credentials are missing outside development.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    load_app_config_with(CredentialPolicy::RequiredOutsideDevelopment)
}

/// Like [`load_app_config`] with an explicit credential policy.
///
/// # Errors
///
/// See [`load_app_config`]; with [`CredentialPolicy::Optional`] missing
/// credentials are never an error.
pub fn load_app_config_with(policy: CredentialPolicy) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_config(|key| std::env::var(key), policy)
}

/// Same as [`load_app_config`] but skips `.env`.
///
/// # Errors
///
/// See [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Outside development the Telegram credentials are mandatory; in
/// development they may be left unset and the server starts unconfigured.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    build_config(lookup, CredentialPolicy::RequiredOutsideDevelopment)
}

/// Builds the config from an injected env-var lookup.
///
/// # Errors
///
/// Returns `ConfigError` when a value does not parse, or when `policy`
/// requires credentials that are missing.
pub fn build_config<F>(lookup: F, policy: CredentialPolicy) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let text = |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_owned());
    let secret = |var: &str| {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&text("PAGEWATCH_ENV", "development"));

    let telegram_bot_token = secret("TELEGRAM_BOT_TOKEN");
    let telegram_chat_id = secret("TELEGRAM_CHAT_ID");
    if policy == CredentialPolicy::RequiredOutsideDevelopment && env != Environment::Development {
        if telegram_bot_token.is_none() {
            return Err(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()));
        }
        if telegram_chat_id.is_none() {
            return Err(ConfigError::MissingEnvVar("TELEGRAM_CHAT_ID".to_string()));
        }
    }

    Ok(AppConfig {
        env,
        bind_addr: parsed(&lookup, "PAGEWATCH_BIND_ADDR", "0.0.0.0:5000")?,
        log_level: text("PAGEWATCH_LOG_LEVEL", "info"),
        telegram_bot_token,
        telegram_chat_id,
        telegram_api_base: text("TELEGRAM_API_BASE", DEFAULT_TELEGRAM_API_BASE),
        dispatch_timeout_secs: parsed(&lookup, "PAGEWATCH_DISPATCH_TIMEOUT_SECS", "10")?,
        geo_timeout_secs: parsed(&lookup, "PAGEWATCH_GEO_TIMEOUT_SECS", "5")?,
        notify_rate_limit: parsed(&lookup, "PAGEWATCH_NOTIFY_RATE_LIMIT", "60")?,
        user_agent: text("PAGEWATCH_USER_AGENT", "pagewatch/0.1"),
    })
}

/// Parses `var` (or `default` when unset) with `FromStr`.
fn parsed<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_owned());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason: e.to_string(),
    })
}

/// Anything unrecognised is treated as development.
fn parse_environment(raw: &str) -> Environment {
    match raw.trim().to_ascii_lowercase().as_str() {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
