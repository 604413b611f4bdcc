// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batch orchestration.
//!
//! Drives one invocation end to end: payload shape check → decode →
//! classify/group fold → per-unit delivery → aggregated result. Units
//! are delivered as soon as the grouper emits them, awaited one at a
//! time; grouping correctness depends on strict batch order.

use crate::config::ChannelConfig;
use crate::decoder;
use crate::grouper::{DeliverableUnit, Grouper};
use crate::notifier::{DeliveryStatus, Notifier};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

/// Result record for one invocation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Default)]
struct BatchCounts {
    processed: usize,
    sent: usize,
    errors: usize,
    skipped: usize,
}

/// Processes one log-subscription event.
///
/// Per-unit delivery failures are absorbed into the counts (207 result);
/// only structural failures (bad base64/gzip, unparseable envelope)
/// produce a 500. Non-log-event payloads and empty batches are no-ops,
/// not errors.
pub async fn handle_event(
    event: &Value,
    notifier: &Notifier,
    config: &ChannelConfig,
) -> InvocationResult {
    let Some(data) = event
        .get("awslogs")
        .and_then(|awslogs| awslogs.get("data"))
        .and_then(Value::as_str)
    else {
        info!("not a CloudWatch Logs event, ignoring");
        return InvocationResult {
            status_code: 200,
            body: "Not CloudWatch event".to_string(),
        };
    };

    debug!("base64 payload length: {}", data.len());
    let envelope = match decoder::decode_payload(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            error!("failed to decode log payload: {e}");
            return InvocationResult {
                status_code: 500,
                body: json!({
                    "error": e.to_string(),
                    "stack": format!("{e:?}"),
                })
                .to_string(),
            };
        }
    };

    if envelope.log_events.is_empty() {
        info!("no log events in payload");
        return InvocationResult {
            status_code: 200,
            body: "No log events".to_string(),
        };
    }

    let mut counts = BatchCounts::default();
    let mut grouper = Grouper::new(config.stack_path_markers.clone());

    for log_event in &envelope.log_events {
        counts.processed += 1;
        for unit in grouper.push(&log_event.message) {
            deliver_unit(notifier, &unit, &mut counts).await;
        }
    }
    if let Some(unit) = grouper.finish() {
        deliver_unit(notifier, &unit, &mut counts).await;
    }

    info!(
        "batch complete: {} processed, {} sent, {} errors",
        counts.processed, counts.sent, counts.errors
    );
    if counts.skipped > 0 {
        debug!("{} units skipped: no webhook configured", counts.skipped);
    }

    InvocationResult {
        status_code: if counts.errors == 0 { 200 } else { 207 },
        body: json!({
            "processed": counts.processed,
            "sent": counts.sent,
            "errors": counts.errors,
        })
        .to_string(),
    }
}

async fn deliver_unit(notifier: &Notifier, unit: &DeliverableUnit, counts: &mut BatchCounts) {
    match notifier.deliver(unit).await {
        Ok(DeliveryStatus::Sent) => counts.sent += 1,
        // skipped counts toward neither sent nor errors: missing webhook
        // configuration is a deployment concern
        Ok(DeliveryStatus::Skipped) => counts.skipped += 1,
        Err(e) => {
            counts.errors += 1;
            warn!("failed to deliver unit of {} lines: {e}", unit.line_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_without_awslogs_is_noop() {
        let config = ChannelConfig::default();
        let notifier = Notifier::new(&config).expect("build notifier");
        let event = json!({"source": "aws.ec2", "detail": {}});
        let result = handle_event(&event, &notifier, &config).await;
        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, "Not CloudWatch event");
    }

    #[tokio::test]
    async fn test_awslogs_without_data_is_noop() {
        let config = ChannelConfig::default();
        let notifier = Notifier::new(&config).expect("build notifier");
        let event = json!({"awslogs": {}});
        let result = handle_event(&event, &notifier, &config).await;
        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, "Not CloudWatch event");
    }

    #[tokio::test]
    async fn test_garbage_payload_is_structural_failure() {
        let config = ChannelConfig::default();
        let notifier = Notifier::new(&config).expect("build notifier");
        let event = json!({"awslogs": {"data": "!!!not base64!!!"}});
        let result = handle_event(&event, &notifier, &config).await;
        assert_eq!(result.status_code, 500);
        let body: Value = serde_json::from_str(&result.body).expect("json body");
        assert!(body.get("error").is_some());
        assert!(body.get("stack").is_some());
    }
}
