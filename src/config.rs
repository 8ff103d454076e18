//! # Commander Configuration
//!
//! Retry policy, stage deadlines and channel sizing, loaded from TOML or taken from
//! [`Default`].
//!
//! ```toml
//! channel_capacity = 64
//!
//! [retry]
//! attempts = 3
//! delay_ms = 30000
//!
//! [deadlines]
//! queue_ms = 240000
//! queue_task_ms = 60000
//! payment_ms = 120000
//! message_ms = 150000
//! employee_ms = 240000
//! ```
//!
//! Every field may be omitted; missing values fall back to the defaults above.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.message().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, first one included.
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 30_000,
        }
    }
}

/// Stage deadlines. All except `queue_task_ms` are measured from order creation;
/// `queue_task_ms` is measured from a task's first drain attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadlineConfig {
    pub queue_ms: u64,
    pub queue_task_ms: u64,
    pub payment_ms: u64,
    pub message_ms: u64,
    pub employee_ms: u64,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            queue_ms: 240_000,
            queue_task_ms: 60_000,
            payment_ms: 120_000,
            message_ms: 150_000,
            employee_ms: 240_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    pub retry: RetryConfig,
    pub deadlines: DeadlineConfig,
    /// Request buffer of the order and queue actors.
    pub channel_capacity: usize,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            deadlines: DeadlineConfig::default(),
            channel_capacity: 64,
        }
    }
}

impl CommanderConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every limit is positive and that a deferred payment can still be
    /// queued for the whole payment window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.attempts must be at least 1".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channel_capacity must be positive".into(),
            ));
        }

        let d = &self.deadlines;
        for (name, value) in [
            ("queue_ms", d.queue_ms),
            ("queue_task_ms", d.queue_task_ms),
            ("payment_ms", d.payment_ms),
            ("message_ms", d.message_ms),
            ("employee_ms", d.employee_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "deadlines.{name} must be positive"
                )));
            }
        }

        if d.payment_ms >= d.queue_ms {
            return Err(ConfigError::Validation(format!(
                "deadlines.payment_ms ({}) must be shorter than deadlines.queue_ms ({})",
                d.payment_ms, d.queue_ms
            )));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry.delay_ms)
    }

    pub fn queue_time(&self) -> Duration {
        Duration::from_millis(self.deadlines.queue_ms)
    }

    pub fn queue_task_time(&self) -> Duration {
        Duration::from_millis(self.deadlines.queue_task_ms)
    }

    pub fn payment_time(&self) -> Duration {
        Duration::from_millis(self.deadlines.payment_ms)
    }

    pub fn message_time(&self) -> Duration {
        Duration::from_millis(self.deadlines.message_ms)
    }

    pub fn employee_time(&self) -> Duration {
        Duration::from_millis(self.deadlines.employee_ms)
    }

    /// Pause between two heads of the drain loop.
    pub fn drain_interval(&self) -> Duration {
        self.queue_task_time() / 3
    }
}

impl FromStr for CommanderConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CommanderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.drain_interval(), Duration::from_secs(20));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CommanderConfig::from_toml_str(
            r#"
            [retry]
            attempts = 5

            [deadlines]
            payment_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.delay_ms, 30_000);
        assert_eq!(config.payment_time(), Duration::from_secs(1));
        assert_eq!(config.queue_time(), Duration::from_secs(240));
    }

    #[test]
    fn test_payment_window_must_fit_queue_window() {
        let err = CommanderConfig::from_toml_str(
            r#"
            [deadlines]
            queue_ms = 1000
            payment_ms = 1000
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = "[retry]\nattempts = 0".parse::<CommanderConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = CommanderConfig::from_toml_str("retry = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
