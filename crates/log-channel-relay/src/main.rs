// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Runs one forwarding invocation: reads a CloudWatch Logs subscription
//! event (JSON) from a file argument or stdin, processes it, and prints
//! the result record on stdout.

use std::io::Read;
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use log_channel_core::{handle_event, ChannelConfig, Notifier};

#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match ChannelConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error creating config on log-channel relay startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let raw_event = match read_event(std::env::args().nth(1)) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Unable to read invocation event: {e}");
            return ExitCode::FAILURE;
        }
    };

    let event: serde_json::Value = match serde_json::from_str(&raw_event) {
        Ok(v) => v,
        Err(e) => {
            error!("Invocation event is not valid JSON: {e}");
            return ExitCode::FAILURE;
        }
    };

    let notifier = match Notifier::new(&config) {
        Ok(n) => n,
        Err(e) => {
            error!("Unable to build webhook client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = handle_event(&event, &notifier, &config).await;

    match serde_json::to_string(&result) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            error!("Unable to serialize invocation result: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Reads the event from the given path, or stdin when no path is given.
fn read_event(path: Option<String>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
