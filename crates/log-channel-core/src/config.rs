// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ChannelError;
use std::env;
use std::time::Duration;

/// Default cap on outbound message length, in characters.
///
/// Google Chat rejects oversized `text` payloads; anything longer is
/// truncated before transmission.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 4000;

/// Default outbound request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Default path fragments that mark a line as part of a stack trace.
pub const DEFAULT_STACK_PATH_MARKERS: &[&str] = &["vendor/", "/var/www/"];

/// Configuration for the log-channel forwarder.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Webhook receiving error blocks and error-severity lines.
    pub error_webhook_url: Option<String>,
    /// Webhook receiving everything else.
    pub general_webhook_url: Option<String>,
    /// Maximum characters per outbound message before truncation.
    pub max_message_chars: usize,
    /// Timeout applied to each webhook POST.
    pub request_timeout: Duration,
    /// Path fragments that mark a line as a stack-trace continuation.
    pub stack_path_markers: Vec<String>,
    /// Log level (e.g., trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            error_webhook_url: None,
            general_webhook_url: None,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            stack_path_markers: DEFAULT_STACK_PATH_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_level: "info".to_string(),
        }
    }
}

impl ChannelConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ChannelError> {
        let error_webhook_url = env::var("GOOGLE_CHAT_ERROR_WEBHOOK").ok();
        let general_webhook_url = env::var("GOOGLE_CHAT_GENERAL_WEBHOOK").ok();
        let max_message_chars = env::var("LOG_CHANNEL_MAX_MESSAGE_CHARS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_MESSAGE_CHARS);
        let request_timeout = env::var("LOG_CHANNEL_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let stack_path_markers = env::var("LOG_CHANNEL_STACK_PATH_MARKERS")
            .ok()
            .map(|val| {
                val.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|markers| !markers.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_STACK_PATH_MARKERS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });
        let log_level = env::var("LOG_CHANNEL_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let config = Self {
            error_webhook_url,
            general_webhook_url,
            max_message_chars,
            request_timeout,
            stack_path_markers,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ChannelError> {
        if self.max_message_chars == 0 {
            return Err(ChannelError::InvalidConfig(
                "message length cap must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ChannelError::InvalidConfig(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        for url in [&self.error_webhook_url, &self.general_webhook_url]
            .into_iter()
            .flatten()
        {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ChannelError::InvalidConfig(format!(
                    "webhook URL must be http(s): '{url}'"
                )));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ChannelError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChannelConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_cap() {
        let config = ChannelConfig {
            max_message_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = ChannelConfig {
            request_timeout: Duration::from_secs(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_webhook_scheme() {
        let config = ChannelConfig {
            error_webhook_url: Some("ftp://chat.example.com/hook".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_https_webhooks() {
        let config = ChannelConfig {
            error_webhook_url: Some("https://chat.googleapis.com/v1/spaces/a/messages".to_string()),
            general_webhook_url: Some("https://chat.googleapis.com/v1/spaces/b/messages".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = ChannelConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_markers() {
        let config = ChannelConfig::default();
        assert_eq!(config.stack_path_markers, vec!["vendor/", "/var/www/"]);
    }
}
