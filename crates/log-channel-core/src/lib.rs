// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Core pipeline for relaying CloudWatch Logs subscription events to
//! Google Chat webhooks.
//!
//! One invocation flows through: [`decoder`] (base64 + gzip + JSON) →
//! [`classifier`] (per-line severity and stack-trace detection) →
//! [`grouper`] (folds consecutive error/stack lines into one block) →
//! [`notifier`] (webhook delivery) → [`handler`] (drives the fold and
//! aggregates the outcome counts).

pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod grouper;
pub mod handler;
pub mod notifier;

pub use config::ChannelConfig;
pub use error::ChannelError;
pub use handler::{handle_event, InvocationResult};
pub use notifier::Notifier;
