// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while decoding a CloudWatch Logs subscription payload.
///
/// All variants are structural: the payload itself is unusable and the
/// invocation fails as a whole (no per-line recovery is possible).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The `awslogs.data` field is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not a valid gzip stream.
    #[error("gzip decompression failed: {0}")]
    Gzip(#[from] std::io::Error),

    /// The decompressed text is not the expected JSON envelope.
    #[error("malformed log envelope: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors raised while delivering one unit to a chat webhook.
///
/// These are recovered per unit: the orchestrator counts them and moves
/// on to the next unit instead of aborting the batch.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The webhook answered with a non-2xx status.
    #[error("webhook rejected message: status {status}: {body}")]
    Delivery { status: u16, body: String },

    /// Transport-level issue (DNS, TLS, socket, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Top-level error taxonomy for the forwarding pipeline.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Invalid configuration detected before any work started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Structural decode failure for the whole payload.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Delivery failure for a single unit.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ChannelError::InvalidConfig("missing webhook URL".to_string());
        assert_eq!(
            error.to_string(),
            "invalid configuration: missing webhook URL"
        );
    }

    #[test]
    fn test_delivery_error_display() {
        let error = NotifyError::Delivery {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "webhook rejected message: status 429: rate limited"
        );
    }

    #[test]
    fn test_decode_error_is_transparent() {
        let inner = serde_json::from_str::<serde_json::Value>("{not json")
            .expect_err("should not parse");
        let error = ChannelError::Decode(DecodeError::Format(inner));
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Format"));
    }
}
