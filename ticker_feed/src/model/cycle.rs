//! Orchestrator states and per-cycle outcomes.

use std::fmt;

use ticker_common::SymbolId;

use crate::error::{FetchFailure, ValidationFailure};

/// Position of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Constructed, no cycle run yet.
    Idle,
    /// Waiting for the batch fetch.
    Fetching,
    /// Normalizing and publishing the fetched batch.
    Distributing,
    /// Waiting for the next tick.
    Sleeping,
    /// Stop signal observed; terminal.
    Cancelled,
}

/// Why a configured symbol produced no record this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Upstream batch had no entry for the symbol.
    MissingFromResponse,
    /// Snapshot failed validation.
    Invalid(ValidationFailure),
    /// Broker send failed; carries the rendered `PublishFailure`.
    PublishFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFromResponse => f.write_str("missing from upstream response"),
            SkipReason::Invalid(e) => write!(f, "validation failed: {}", e),
            SkipReason::PublishFailed(e) => write!(f, "publish failed: {}", e),
        }
    }
}

/// A symbol that was not published, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSymbol {
    /// Affected symbol.
    pub symbol: SymbolId,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of the distributing phase of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Symbols whose record was handed to the broker.
    pub published: Vec<SymbolId>,
    /// Symbols skipped this cycle.
    pub skipped: Vec<SkippedSymbol>,
}

impl CycleReport {
    pub(crate) fn skip(&mut self, symbol: SymbolId, reason: SkipReason) {
        self.skipped.push(SkippedSymbol { symbol, reason });
    }
}

/// How a single cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The batch fetch failed; nothing was published.
    FetchFailed(FetchFailure),
    /// The batch was fetched and distributed.
    Distributed(CycleReport),
    /// The stop signal arrived mid-cycle.
    Cancelled,
}
