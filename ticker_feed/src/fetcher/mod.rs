//! Snapshot fetcher.
//!
//! `QuoteSource` is the seam to the upstream venue: one batched call for a set of
//! symbols. `SnapshotFetcher` wraps a source and folds its errors into the
//! `FetchFailure` classes the orchestrator reacts to. It never retries; the next
//! tick is the retry.

pub mod binance;

use std::collections::{HashMap, HashSet};

use log::debug;
use ticker_common::SymbolId;

use crate::error::{FetchFailure, FetchFailureKind, SourceError};
use crate::model::snapshot::RawSnapshot;

/// Upstream capability: fetch ticker snapshots for a set of symbols in one request.
pub trait QuoteSource: Send + Sync {
    /// Human-readable source identity used in logs.
    fn name(&self) -> &str;

    /// Fetch snapshots for `symbols` in a single batched request.
    fn fetch_tickers(
        &self,
        symbols: &[SymbolId],
    ) -> Result<HashMap<SymbolId, RawSnapshot>, SourceError>;

    /// Startup reachability check.
    fn probe(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Wraps a `QuoteSource` and classifies its failures.
pub struct SnapshotFetcher<S> {
    source: S,
}

impl<S: QuoteSource> SnapshotFetcher<S> {
    /// Wrap `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Identity of the wrapped source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch all `symbols` in one batch.
    ///
    /// Entries the source returns for symbols that were not requested are dropped.
    pub fn fetch_all(
        &self,
        symbols: &[SymbolId],
    ) -> Result<HashMap<SymbolId, RawSnapshot>, FetchFailure> {
        let mut batch = self.source.fetch_tickers(symbols).map_err(classify)?;

        let requested: HashSet<&SymbolId> = symbols.iter().collect();
        batch.retain(|symbol, _| {
            let keep = requested.contains(symbol);
            if !keep {
                debug!("Ignoring unrequested symbol {} from {}", symbol, self.source.name());
            }
            keep
        });
        Ok(batch)
    }
}

/// Map a source error onto the orchestrator's failure classes.
pub fn classify(err: SourceError) -> FetchFailure {
    match err {
        SourceError::Connectivity(msg) => FetchFailure::new(FetchFailureKind::Network, msg),
        SourceError::Rejected(msg) => FetchFailure::new(FetchFailureKind::Upstream, msg),
        SourceError::Other(msg) => FetchFailure::new(FetchFailureKind::Unknown, msg),
    }
}
