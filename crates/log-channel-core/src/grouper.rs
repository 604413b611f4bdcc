// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Stack-trace grouping state machine.
//!
//! Folds the classified line stream, in batch order, into deliverable
//! units: consecutive `ErrorStart` + `Continuation` lines become one
//! [`DeliverableUnit::Block`]; everything else becomes a
//! [`DeliverableUnit::Single`]. At most one block is open at a time and
//! no block is ever emitted empty.

use crate::classifier::{self, LineClass, Severity};

/// The atomic item sent to a notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverableUnit {
    /// One standalone line, routed by severity.
    Single { message: String, severity: Severity },
    /// One error line plus its stack-trace continuation lines. Always
    /// routed to the error webhook.
    Block { lines: Vec<String> },
}

impl DeliverableUnit {
    /// Number of input lines this unit accounts for.
    pub fn line_count(&self) -> usize {
        match self {
            DeliverableUnit::Single { .. } => 1,
            DeliverableUnit::Block { lines } => lines.len(),
        }
    }
}

/// Grouping state between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrouperState {
    /// No open block.
    Idle,
    /// One open block with at least one line (the `ErrorStart`).
    Collecting(Vec<String>),
}

impl GrouperState {
    fn take_block(&mut self) -> Option<DeliverableUnit> {
        match std::mem::replace(self, GrouperState::Idle) {
            GrouperState::Collecting(lines) => Some(DeliverableUnit::Block { lines }),
            GrouperState::Idle => None,
        }
    }
}

/// Pure transition function.
///
/// Consumes one classified line and returns the units emitted by this
/// step, in order. An `Ordinary` line closing an open block emits two
/// units: the flushed block first, then the single.
pub fn step(
    state: &mut GrouperState,
    class: LineClass,
    line: &str,
) -> Vec<DeliverableUnit> {
    let mut emitted = Vec::new();
    match class {
        LineClass::ErrorStart => {
            if let Some(block) = state.take_block() {
                emitted.push(block);
            }
            *state = GrouperState::Collecting(vec![line.to_string()]);
        }
        LineClass::Continuation => match state {
            GrouperState::Collecting(lines) => lines.push(line.to_string()),
            // the classifier only yields Continuation inside a block
            GrouperState::Idle => emitted.push(DeliverableUnit::Single {
                message: line.to_string(),
                severity: classifier::severity(line),
            }),
        },
        LineClass::Ordinary => {
            if let Some(block) = state.take_block() {
                emitted.push(block);
            }
            emitted.push(DeliverableUnit::Single {
                message: line.to_string(),
                severity: classifier::severity(line),
            });
        }
    }
    emitted
}

/// Final flush at end of batch.
pub fn finish(state: GrouperState) -> Option<DeliverableUnit> {
    match state {
        GrouperState::Collecting(lines) => Some(DeliverableUnit::Block { lines }),
        GrouperState::Idle => None,
    }
}

/// Stateful wrapper that owns the classification context.
#[derive(Debug)]
pub struct Grouper {
    state: GrouperState,
    path_markers: Vec<String>,
}

impl Grouper {
    pub fn new(path_markers: Vec<String>) -> Self {
        Self {
            state: GrouperState::Idle,
            path_markers,
        }
    }

    /// Feeds one raw line, returning any units completed by it.
    pub fn push(&mut self, line: &str) -> Vec<DeliverableUnit> {
        let in_block = matches!(self.state, GrouperState::Collecting(_));
        let class = classifier::classify(line, in_block, &self.path_markers);
        step(&mut self.state, class, line)
    }

    /// Flushes the open block, if any. Ends the batch.
    pub fn finish(self) -> Option<DeliverableUnit> {
        finish(self.state)
    }
}
