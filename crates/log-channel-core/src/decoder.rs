// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of the CloudWatch Logs subscription payload.
//!
//! Subscription deliveries arrive as `gzip(JSON)` wrapped in base64
//! inside `awslogs.data`. The decoded envelope carries the batch of log
//! events this invocation processes.

use crate::error::DecodeError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::io::Read;

/// One log line from the subscribed log group.
///
/// CloudWatch also sends `id` and `timestamp` per event; only the
/// message text matters here, the rest is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEvent {
    pub message: String,
}

/// Decompressed subscription envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsEnvelope {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub log_group: Option<String>,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
}

/// Decodes `awslogs.data` into the parsed envelope.
///
/// Steps: base64-decode → gzip-decompress → JSON parse. Bad base64,
/// bad gzip, and JSON syntax errors are structural; valid JSON of an
/// unexpected shape yields an empty envelope so the caller can treat it
/// as a no-op batch instead of crashing the invocation.
pub fn decode_payload(data: &str) -> Result<LogsEnvelope, DecodeError> {
    let compressed = BASE64_STANDARD.decode(data)?;
    tracing::debug!("decoded base64 payload: {} bytes", compressed.len());

    let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    tracing::debug!("decompressed payload: {} bytes", decompressed.len());

    let value: serde_json::Value = serde_json::from_slice(&decompressed)?;
    let envelope: LogsEnvelope = serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("unexpected envelope shape, treating as empty batch: {e}");
        LogsEnvelope::default()
    });
    tracing::debug!(
        "log envelope: type={:?} group={:?} events={}",
        envelope.message_type,
        envelope.log_group,
        envelope.log_events.len()
    );
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn encode_payload(json: &str) -> String {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).expect("gzip write");
        let compressed = encoder.finish().expect("gzip finish");
        BASE64_STANDARD.encode(compressed)
    }

    #[test]
    fn test_decode_round_trip() {
        let payload = encode_payload(
            r#"{"messageType":"DATA_MESSAGE","logGroup":"/aws/app","logEvents":[{"message":"hello"},{"message":"world"}]}"#,
        );
        let envelope = decode_payload(&payload).expect("decode");
        assert_eq!(envelope.message_type.as_deref(), Some("DATA_MESSAGE"));
        assert_eq!(envelope.log_group.as_deref(), Some("/aws/app"));
        assert_eq!(envelope.log_events.len(), 2);
        assert_eq!(envelope.log_events[0].message, "hello");
    }

    #[test]
    fn test_decode_tolerates_extra_fields() {
        let payload = encode_payload(
            r#"{"messageType":"DATA_MESSAGE","owner":"123456789012","logGroup":"/aws/app","logStream":"web","subscriptionFilters":["all"],"logEvents":[{"id":"0","timestamp":1700000000000,"message":"ok"}]}"#,
        );
        let envelope = decode_payload(&payload).expect("decode");
        assert_eq!(envelope.log_events.len(), 1);
        assert_eq!(envelope.log_events[0].message, "ok");
    }

    #[test]
    fn test_decode_missing_log_events_is_empty() {
        let payload = encode_payload(r#"{"messageType":"CONTROL_MESSAGE"}"#);
        let envelope = decode_payload(&payload).expect("decode");
        assert!(envelope.log_events.is_empty());
    }

    #[test]
    fn test_decode_bad_base64() {
        let err = decode_payload("not-base64!!!").expect_err("should fail");
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_decode_not_gzip() {
        let payload = BASE64_STANDARD.encode(b"plain text, no gzip magic");
        let err = decode_payload(&payload).expect_err("should fail");
        assert!(matches!(err, DecodeError::Gzip(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let payload = encode_payload("{this is not json");
        let err = decode_payload(&payload).expect_err("should fail");
        assert!(matches!(err, DecodeError::Format(_)));
    }

    #[test]
    fn test_decode_unexpected_shape_is_empty_batch() {
        let payload = encode_payload(r#"["not", "an", "envelope"]"#);
        let envelope = decode_payload(&payload).expect("decode");
        assert!(envelope.log_events.is_empty());
    }
}
