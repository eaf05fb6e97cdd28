//! Configuration for the homework watcher.
//!
//! Non-secret settings come from an optional TOML file ([`WatchConfig`]).
//! Secrets always come from the environment ([`Credentials`]).

use crate::error::{Result, WatchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "HOMEWORK_WATCH_CONFIG";

/// Environment variable holding the status API OAuth token.
pub const PRACTICUM_TOKEN_ENV: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat id.
pub const TELEGRAM_CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Non-secret watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Homework status endpoint.
    pub endpoint: String,
    /// Base URL of the Telegram Bot API.
    pub telegram_api_base: String,
    /// Seconds to sleep between poll cycles.
    pub retry_period_secs: u64,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout_secs: u64,
    /// SQLite database holding the last seen statuses.
    pub db_path: PathBuf,
    /// Optional file that receives a copy of the log output.
    pub log_file: Option<PathBuf>,
    /// `from_date` cursor sent to the API (None = process start time).
    pub from_date: Option<i64>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_owned(),
            telegram_api_base: "https://api.telegram.org".to_owned(),
            retry_period_secs: 600,
            request_timeout_secs: 30,
            db_path: PathBuf::from("homework_db.sqlite"),
            log_file: None,
            from_date: None,
        }
    }
}

impl WatchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| WatchError::Config(e.to_string()))
    }

    /// Resolve configuration from `HOMEWORK_WATCH_CONFIG`, then the default
    /// config path, falling back to built-in defaults when neither exists.
    ///
    /// # Errors
    ///
    /// An explicitly named file that cannot be loaded is an error.
    pub fn load() -> Result<Self> {
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&explicit));
        }
        match Self::default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the default config file path: `~/.config/homework-watch/config.toml`.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("homework-watch").join("config.toml"))
    }

    /// Sleep between cycles.
    #[must_use]
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    /// HTTP request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cursor for the status API, fixed once per process.
    #[must_use]
    pub fn resolved_from_date(&self) -> i64 {
        self.from_date.unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

/// Secrets required to run the watcher.
///
/// `Debug` redacts every value so credentials never reach the logs.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth token for the status API.
    pub practicum_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Destination chat id.
    pub telegram_chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &redact(&self.practicum_token))
            .field("telegram_token", &redact(&self.telegram_token))
            .field("telegram_chat_id", &redact(&self.telegram_chat_id))
            .finish()
    }
}

fn redact(s: &str) -> &str {
    if s.is_empty() { "" } else { "[REDACTED]" }
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::MissingConfig`] listing every absent or blank variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::MissingConfig`] listing every absent or blank variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut fetch = |name: &str| match lookup(name) {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                missing.push(name.to_owned());
                String::new()
            }
        };

        let practicum_token = fetch(PRACTICUM_TOKEN_ENV);
        let telegram_token = fetch(TELEGRAM_TOKEN_ENV);
        let telegram_chat_id = fetch(TELEGRAM_CHAT_ID_ENV);

        if !missing.is_empty() {
            return Err(WatchError::MissingConfig(missing));
        }
        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
        })
    }
}
