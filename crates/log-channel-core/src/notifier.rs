// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Webhook delivery.
//!
//! One outbound POST per deliverable unit, awaited to completion.
//! Blocks always go to the error webhook; standalone lines are routed
//! by severity. A unit whose webhook is not configured is skipped —
//! missing configuration is a deployment concern, not a runtime
//! failure.

use crate::classifier::Severity;
use crate::config::ChannelConfig;
use crate::error::NotifyError;
use crate::grouper::DeliverableUnit;
use serde_json::json;
use tracing::{debug, error};

/// Ellipsis marker appended to truncated messages.
const TRUNCATION_MARKER: &str = "...";

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The webhook accepted the message.
    Sent,
    /// No webhook configured for this unit's route.
    Skipped,
}

/// Caps `text` at `max_chars` characters, appending a marker.
///
/// Char-based so the result is always valid UTF-8. Idempotent: the kept
/// prefix of an already-truncated message is unchanged, so re-applying
/// reproduces the same string.
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let prefix: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_none() {
        return text.to_string();
    }
    let mut truncated = prefix;
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Delivers formatted messages to the configured chat webhooks.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    error_webhook_url: Option<String>,
    general_webhook_url: Option<String>,
    max_message_chars: usize,
}

impl Notifier {
    /// Builds a notifier with one long-lived HTTP client.
    pub fn new(config: &ChannelConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            error_webhook_url: config.error_webhook_url.clone(),
            general_webhook_url: config.general_webhook_url.clone(),
            max_message_chars: config.max_message_chars,
        })
    }

    /// Delivers one unit, returning whether it was sent or skipped.
    ///
    /// Non-2xx responses and transport failures surface as
    /// [`NotifyError`]; the caller decides whether to keep going.
    pub async fn deliver(&self, unit: &DeliverableUnit) -> Result<DeliveryStatus, NotifyError> {
        let (webhook, text) = match unit {
            DeliverableUnit::Block { lines } => {
                debug!("delivering error block of {} lines", lines.len());
                (self.error_webhook_url.as_deref(), lines.join("\n"))
            }
            DeliverableUnit::Single { message, severity } => {
                let webhook = match severity {
                    Severity::Error => self.error_webhook_url.as_deref(),
                    Severity::General => self.general_webhook_url.as_deref(),
                };
                (webhook, message.clone())
            }
        };

        let Some(url) = webhook else {
            debug!("no webhook configured for this route, skipping unit");
            return Ok(DeliveryStatus::Skipped);
        };

        self.post(url, &text).await?;
        Ok(DeliveryStatus::Sent)
    }

    async fn post(&self, url: &str, text: &str) -> Result<(), NotifyError> {
        let final_text = truncate_message(text, self.max_message_chars);
        let response = self
            .client
            .post(url)
            .json(&json!({ "text": final_text }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("webhook accepted message: status {status}");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("webhook rejected message: status {status}: {body}");
        Err(NotifyError::Delivery {
            status: status.as_u16(),
            body,
        })
    }
}
