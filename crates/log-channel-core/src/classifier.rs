// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-line classification.
//!
//! Two related but distinct pattern sets are kept as separate
//! predicates on purpose: [`is_error_start`] decides whether a line
//! opens a grouped error block while scanning, and
//! [`is_reportable_error`] decides which webhook a *standalone* line is
//! routed to. Both share the keepalive exclusion, which would otherwise
//! false-positive on benign nginx connection-close notices.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Markers that open a grouped error block: application error-level
    /// prefixes (`production.ERROR`, `ERROR:`, `CRITICAL:`, `ALERT:`,
    /// `EMERGENCY:`), case-insensitive.
    static ref ERROR_START_REGEX: Regex = Regex::new(
        r"(?i)(production\.ERROR|\.ERROR[: ]|\bERROR:|\bCRITICAL:|\bALERT:|\bEMERGENCY:)"
    )
    .expect("failed creating regex");

    /// Broader single-line routing pattern: the block-start markers plus
    /// PHP fatal/parse errors, SQLSTATE codes, and upstream 502/503/504
    /// status tokens.
    static ref REPORTABLE_ERROR_REGEX: Regex = Regex::new(
        r"(?i)(production\.ERROR|\.ERROR[: ]|\bERROR:|\bCRITICAL:|\bALERT:|\bEMERGENCY:|\bFatal error:|\[error\]|\[emerg\]|\[crit\]|PHP Fatal|PHP Parse|SQLSTATE|502\s|503\s|504\s)"
    )
    .expect("failed creating regex");

    /// Benign nginx keepalive shutdown notices. These contain words that
    /// trip the error patterns but carry no signal.
    static ref BENIGN_NOISE_REGEX: Regex =
        Regex::new(r"(?i)\[info\].*closed (keepalive )?connection").expect("failed creating regex");
}

/// Classification of one log line relative to the grouping context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Opens a new error block.
    ErrorStart,
    /// Extends the currently open error block.
    Continuation,
    /// Stands alone.
    Ordinary,
}

/// Which webhook a standalone line is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    General,
}

/// Informational noise that must never count as an error.
pub fn is_benign_noise(line: &str) -> bool {
    BENIGN_NOISE_REGEX.is_match(line)
}

/// Does this line open a grouped error block?
pub fn is_error_start(line: &str) -> bool {
    ERROR_START_REGEX.is_match(line) && !is_benign_noise(line)
}

/// Should a standalone line be routed to the error webhook?
pub fn is_reportable_error(line: &str) -> bool {
    REPORTABLE_ERROR_REGEX.is_match(line) && !is_benign_noise(line)
}

/// Does this line look like a stack-trace artifact?
///
/// Only meaningful while an error block is open; outside a block these
/// shapes are ordinary lines.
pub fn is_stack_continuation(line: &str, path_markers: &[String]) -> bool {
    line.starts_with("Stack trace:")
        || line.starts_with('#')
        || path_markers.iter().any(|marker| line.contains(marker.as_str()))
        || line.trim().is_empty()
}

/// Classifies one line given the grouping context.
pub fn classify(line: &str, in_block: bool, path_markers: &[String]) -> LineClass {
    if is_error_start(line) {
        LineClass::ErrorStart
    } else if in_block && is_stack_continuation(line, path_markers) {
        LineClass::Continuation
    } else {
        LineClass::Ordinary
    }
}

/// Routing severity for a standalone line.
pub fn severity(line: &str) -> Severity {
    if is_reportable_error(line) {
        Severity::Error
    } else {
        Severity::General
    }
}
