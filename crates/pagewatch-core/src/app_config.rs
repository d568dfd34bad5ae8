use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
    pub dispatch_timeout_secs: u64,
    pub geo_timeout_secs: u64,
    pub notify_rate_limit: usize,
    pub user_agent: String,
}

impl AppConfig {
    /// Whether a real messaging destination has been supplied.
    ///
    /// Blank values and the `YOUR_BOT...` / `YOUR_CHAT...` template
    /// placeholders count as unset.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.bot_token_set() && self.chat_id_set()
    }

    #[must_use]
    pub fn bot_token_set(&self) -> bool {
        is_real_credential(self.telegram_bot_token.as_deref(), "YOUR_BOT")
    }

    #[must_use]
    pub fn chat_id_set(&self) -> bool {
        is_real_credential(self.telegram_chat_id.as_deref(), "YOUR_CHAT")
    }
}

fn is_real_credential(value: Option<&str>, placeholder_marker: &str) -> bool {
    value
        .map(str::trim)
        .is_some_and(|v| !v.is_empty() && !v.contains(placeholder_marker))
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("dispatch_timeout_secs", &self.dispatch_timeout_secs)
            .field("geo_timeout_secs", &self.geo_timeout_secs)
            .field("notify_rate_limit", &self.notify_rate_limit)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
