//! Cycle orchestrator: the polling control loop.
//!
//! Each cycle moves `Fetching -> Distributing -> Sleeping`:
//!
//! - `Fetching` runs one batched fetch on a short-lived worker thread so the stop signal
//!   can abandon it. A `FetchFailure` is logged and the cycle goes straight to sleep.
//! - `Distributing` normalizes and publishes every configured symbol in order. A symbol
//!   missing from the batch, failing validation or failing to publish is logged and
//!   skipped; the others proceed.
//! - `Sleeping` waits until `cycle start + interval`. An overrunning cycle starts the
//!   next one immediately, so lateness never accumulates.
//!
//! Cycles never overlap. The loop only ends on the stop signal (or when every stop
//! sender is dropped), after which the publisher is closed.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError, bounded, select};
use log::{debug, info, trace, warn};
use ticker_common::SymbolId;

use crate::config::FeedConfig;
use crate::error::{FetchFailure, FetchFailureKind};
use crate::fetcher::{QuoteSource, SnapshotFetcher};
use crate::model::cycle::{CycleOutcome, CycleReport, CycleState, SkipReason};
use crate::model::snapshot::RawSnapshot;
use crate::normalizer::normalize;
use crate::publisher::{PubSub, Publisher};

type Batch = HashMap<SymbolId, RawSnapshot>;

/// Owns the collaborators and drives the fetch/distribute/sleep loop.
pub struct CycleOrchestrator<S, P> {
    fetcher: Arc<SnapshotFetcher<S>>,
    publisher: Publisher<P>,
    symbols: Arc<[SymbolId]>,
    channel: String,
    interval: Duration,
    state: CycleState,
}

impl<S, P> CycleOrchestrator<S, P>
where
    S: QuoteSource + 'static,
    P: PubSub,
{
    /// Wire the collaborators with the symbols, channel and cadence from `config`.
    pub fn new(fetcher: SnapshotFetcher<S>, publisher: Publisher<P>, config: &FeedConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            publisher,
            symbols: config.symbols.clone().into(),
            channel: config.channel.clone(),
            interval: config.poll_interval,
            state: CycleState::Idle,
        }
    }

    #[cfg(test)]
    fn state(&self) -> CycleState {
        self.state
    }

    /// Run cycles until `stop` fires, then close the publisher.
    pub fn run(mut self, stop: Receiver<()>) {
        let names: Vec<&str> = self.symbols.iter().map(SymbolId::as_str).collect();
        info!(
            "Starting ticker feed for {} from {} every {:?} on channel '{}'",
            names.join(", "),
            self.fetcher.source_name(),
            self.interval,
            self.channel
        );

        loop {
            let started = Instant::now();
            if matches!(self.run_cycle(&stop), CycleOutcome::Cancelled) {
                break;
            }
            if !self.sleep_until(started + self.interval, &stop) {
                break;
            }
        }

        self.enter(CycleState::Cancelled);
        self.publisher.close();
        info!("Ticker feed stopped");
    }

    /// Run one fetch and distribution pass.
    pub fn run_cycle(&mut self, stop: &Receiver<()>) -> CycleOutcome {
        let started = Instant::now();
        self.enter(CycleState::Fetching);

        let mut batch = match self.fetch(stop) {
            None => return CycleOutcome::Cancelled,
            Some(Err(failure)) => {
                warn!("Cycle skipped after {:?}: {}", started.elapsed(), failure);
                return CycleOutcome::FetchFailed(failure);
            }
            Some(Ok(batch)) => batch,
        };

        self.enter(CycleState::Distributing);
        let mut report = CycleReport::default();
        let symbols = Arc::clone(&self.symbols);
        for symbol in symbols.iter() {
            if stop_requested(stop) {
                return CycleOutcome::Cancelled;
            }
            match batch.remove(symbol) {
                Some(raw) => self.distribute(symbol, &raw, &mut report),
                None => {
                    warn!("Skipped {}: {}", symbol, SkipReason::MissingFromResponse);
                    report.skip(symbol.clone(), SkipReason::MissingFromResponse);
                }
            }
        }

        debug!(
            "Cycle finished in {:?}: {} published, {} skipped",
            started.elapsed(),
            report.published.len(),
            report.skipped.len()
        );
        CycleOutcome::Distributed(report)
    }

    fn distribute(&mut self, symbol: &SymbolId, raw: &RawSnapshot, report: &mut CycleReport) {
        let reason = match normalize(raw) {
            Err(invalid) => SkipReason::Invalid(invalid),
            Ok(record) => match self.publisher.publish(&self.channel, &record) {
                Ok(()) => {
                    info!("Published update: {}", record.summary());
                    report.published.push(symbol.clone());
                    return;
                }
                Err(e) => SkipReason::PublishFailed(e.to_string()),
            },
        };
        warn!("Skipped {}: {}", symbol, reason);
        report.skip(symbol.clone(), reason);
    }

    /// Fetch on a worker thread. `None` means the stop signal won the race; the worker
    /// is left to finish on its own timeout and its result is dropped.
    fn fetch(&self, stop: &Receiver<()>) -> Option<Result<Batch, FetchFailure>> {
        let (tx, rx) = bounded(1);
        let fetcher = Arc::clone(&self.fetcher);
        let symbols = Arc::clone(&self.symbols);

        let spawned = thread::Builder::new()
            .name("ticker-fetch".into())
            .spawn(move || {
                let _ = tx.send(fetcher.fetch_all(&symbols));
            });
        if let Err(e) = spawned {
            return Some(Err(FetchFailure::new(
                FetchFailureKind::Unknown,
                format!("could not start fetch worker: {}", e),
            )));
        }

        select! {
            recv(stop) -> _ => None,
            recv(rx) -> result => Some(result.unwrap_or_else(|_| {
                Err(FetchFailure::new(
                    FetchFailureKind::Unknown,
                    "fetch worker terminated unexpectedly",
                ))
            })),
        }
    }

    /// Wait for `deadline`. Returns `false` when the stop signal arrives first.
    fn sleep_until(&mut self, deadline: Instant, stop: &Receiver<()>) -> bool {
        self.enter(CycleState::Sleeping);
        let now = Instant::now();
        if deadline <= now {
            debug!("Cycle overran the poll interval by {:?}", now - deadline);
            return !stop_requested(stop);
        }

        select! {
            recv(stop) -> _ => false,
            default(deadline - now) => true,
        }
    }

    fn enter(&mut self, next: CycleState) {
        trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Non-blocking stop check; a disconnected stop channel counts as a stop.
fn stop_requested(stop: &Receiver<()>) -> bool {
    !matches!(stop.try_recv(), Err(TryRecvError::Empty))
}
