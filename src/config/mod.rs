//! Runtime configuration read from `TASKBOT_*` environment variables.

use crate::messaging::adapters::telegram::TelegramConfig;
use crate::notification::services::DispatcherConfig;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const TOKEN: &str = "TASKBOT_TELEGRAM_TOKEN";
const API_URL: &str = "TASKBOT_TELEGRAM_API_URL";
const DATABASE_URL: &str = "TASKBOT_DATABASE_URL";
const NOTIFY_WORKERS: &str = "TASKBOT_NOTIFY_WORKERS";
const NOTIFY_QUEUE: &str = "TASKBOT_NOTIFY_QUEUE";
const EVIDENCE_TTL: &str = "TASKBOT_EVIDENCE_TTL_SECS";
const POLL_TIMEOUT: &str = "TASKBOT_POLL_TIMEOUT_SECS";
const HTTP_TIMEOUT: &str = "TASKBOT_HTTP_TIMEOUT_SECS";
const LOG_FORMAT: &str = "TASKBOT_LOG_FORMAT";

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_WORKERS: NonZeroUsize = non_zero(4);
const DEFAULT_QUEUE: NonZeroUsize = non_zero(256);

const fn non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(count) => count,
        None => NonZeroUsize::MIN,
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("{variable} has invalid value {value:?}: {reason}")]
    Invalid {
        /// Variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bot API token.
    pub telegram_token: String,
    /// Bot API base URL.
    pub telegram_api_url: String,
    /// `PostgreSQL` URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Number of notification workers.
    pub notify_workers: NonZeroUsize,
    /// Capacity of the notification queue.
    pub notify_queue: NonZeroUsize,
    /// Inactivity window for pending evidence.
    pub evidence_ttl: Duration,
    /// Long-poll window for inbound events.
    pub poll_timeout: Duration,
    /// Timeout for a single outbound request.
    pub http_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first variable that is missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first variable that is missing or
    /// invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let telegram_token = read(TOKEN).ok_or(ConfigError::Missing(TOKEN))?;
        let telegram_api_url = read(API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        if !telegram_api_url.starts_with("http://") && !telegram_api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                variable: API_URL,
                value: telegram_api_url,
                reason: "expected an http(s) URL",
            });
        }

        Ok(Self {
            telegram_token,
            telegram_api_url,
            database_url: read(DATABASE_URL),
            notify_workers: count(NOTIFY_WORKERS, read(NOTIFY_WORKERS), DEFAULT_WORKERS)?,
            notify_queue: count(NOTIFY_QUEUE, read(NOTIFY_QUEUE), DEFAULT_QUEUE)?,
            evidence_ttl: seconds(EVIDENCE_TTL, read(EVIDENCE_TTL), 1800)?,
            poll_timeout: seconds(POLL_TIMEOUT, read(POLL_TIMEOUT), 30)?,
            http_timeout: seconds(HTTP_TIMEOUT, read(HTTP_TIMEOUT), 10)?,
            log_format: read(LOG_FORMAT).map_or(Ok(LogFormat::Text), |value| {
                value.parse().map_err(|()| ConfigError::Invalid {
                    variable: LOG_FORMAT,
                    value,
                    reason: "expected `text` or `json`",
                })
            })?,
        })
    }

    /// Settings for the Telegram adapter.
    #[must_use]
    pub fn telegram(&self) -> TelegramConfig {
        TelegramConfig {
            token: self.telegram_token.clone(),
            api_url: self.telegram_api_url.clone(),
            request_timeout: self.http_timeout,
            poll_timeout: self.poll_timeout,
        }
    }

    /// Settings for the notification dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig {
            workers: self.notify_workers.get(),
            queue_capacity: self.notify_queue.get(),
            send_timeout: self.http_timeout,
        }
    }
}

fn count(
    variable: &'static str,
    value: Option<String>,
    default: NonZeroUsize,
) -> Result<NonZeroUsize, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    raw.parse::<NonZeroUsize>().map_err(|_| ConfigError::Invalid {
        variable,
        value: raw,
        reason: "expected a positive integer",
    })
}

fn seconds(
    variable: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = value else {
        return Ok(Duration::from_secs(default));
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            variable,
            value: raw,
            reason: "expected a positive number of seconds",
        }),
    }
}

#[cfg(test)]
mod tests;
