use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AI_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";
const DEFAULT_AI_API_URL: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    Missing(&'static str),
    /// A variable is set but its value can't be used.
    Invalid { var: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "{} must be set", var),
            Self::Invalid { var, reason } => write!(f, "invalid {}: {}", var, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub telegram_bot_token: String,
    /// Override for the Bot API base URL (tests, local Bot API server).
    pub telegram_api_url: Option<reqwest::Url>,
    pub cf_account_id: String,
    pub cf_api_token: String,
    pub ai_model: String,
    pub ai_api_url: String,
    pub ai_timeout: Duration,
    pub bind_addr: SocketAddr,
    /// Directory for the log file. Stdout only when unset.
    pub log_dir: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("cf_account_id", &self.cf_account_id)
            .field("cf_api_token", &"<redacted>")
            .field("ai_model", &self.ai_model)
            .field("ai_api_url", &self.ai_api_url)
            .field("ai_timeout", &self.ai_timeout)
            .field("bind_addr", &self.bind_addr)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let telegram_bot_token = require("TELEGRAM_BOT_TOKEN")?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_valid = match telegram_bot_token.split_once(':') {
            Some((id, secret)) => id.parse::<u64>().is_ok() && !secret.is_empty() && !secret.contains(':'),
            None => false,
        };
        if !token_valid {
            return Err(ConfigError::Invalid {
                var: "TELEGRAM_BOT_TOKEN",
                reason: "expected format 123456789:ABCdefGHI...".into(),
            });
        }

        let telegram_api_url = get("TELEGRAM_API_URL")
            .map(|raw| {
                reqwest::Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    var: "TELEGRAM_API_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let cf_account_id = require("CF_ACCOUNT_ID")?;
        let cf_api_token = require("CF_API_TOKEN")?;

        let ai_model = get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());
        let ai_api_url = get("AI_API_URL")
            .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let ai_timeout_secs = match get("AI_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::Invalid {
                        var: "AI_TIMEOUT_SECS",
                        reason: format!("expected a positive number of seconds, got '{}'", raw),
                    });
                }
                Ok(secs) => secs,
            },
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "BIND_ADDR",
            reason: format!("'{}': {}", bind_raw, e),
        })?;

        Ok(Self {
            telegram_bot_token,
            telegram_api_url,
            cf_account_id,
            cf_api_token,
            ai_model,
            ai_api_url,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            bind_addr,
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }
}
