//! Ticker feed: polls a quote venue and republishes normalized tickers on Redis.
//!
//! This binary wires together the building blocks and then hands control to the
//! orchestrator:
//!
//! - `BinanceSource` — one batched REST call per cycle for every configured symbol,
//!   wrapped by `SnapshotFetcher`, which classifies failures as network, upstream or
//!   unknown.
//! - `normalizer` — turns each raw snapshot into a `CanonicalTickerRecord`; a snapshot
//!   without a usable price is dropped, missing optional values stay `null`.
//! - `RedisPubSub` — fire-and-forget `PUBLISH` of the JSON record, fronted by `Publisher`.
//! - `CycleOrchestrator` — fetch, distribute, sleep; the interval is measured from the
//!   start of each fetch.
//!
//! Startup and shutdown:
//! - Configuration errors, an unreachable venue or an unreachable broker end the process
//!   with a non-zero status before the loop starts.
//! - Once running, fetch/validation/publish failures are only logged.
//! - Ctrl+C (or SIGTERM) is forwarded into a `crossbeam_channel` stop channel; the loop
//!   exits cleanly and the broker connection is closed.
#![warn(missing_docs)]
use std::process::ExitCode;

use clap::Parser;
use crossbeam_channel::bounded;
use log::{error, info};

use crate::config::{Args, FeedConfig};
use crate::error::StartupFailure;
use crate::fetcher::binance::BinanceSource;
use crate::fetcher::{QuoteSource, SnapshotFetcher};
use crate::orchestrator::CycleOrchestrator;
use crate::publisher::Publisher;
use crate::publisher::redis_client::RedisPubSub;

mod config;
mod error;
mod fetcher;
pub mod model;
mod normalizer;
mod orchestrator;
mod publisher;

fn main() -> ExitCode {
    init_logger();
    match start() {
        Ok(()) => {
            info!("Application terminated.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Startup failed, {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Build the collaborators, install the stop handler and run until stopped.
fn start() -> Result<(), StartupFailure> {
    let config = FeedConfig::from_args(Args::parse())?;

    let source = BinanceSource::new(
        config.exchange,
        config.exchange_url.clone(),
        config.connect_timeout,
    )
    .map_err(|e| StartupFailure::Upstream(e.to_string()))?;
    source
        .probe()
        .map_err(|e| StartupFailure::Upstream(format!("{} unreachable: {}", source.name(), e)))?;
    info!("Initialized exchange: {}", source.name());

    let broker = RedisPubSub::connect(&config.redis_url, config.connect_timeout).map_err(|e| {
        StartupFailure::PubSub(format!("could not connect to {}: {}", config.redis_url, e))
    })?;
    info!("Connected to Redis at {}", config.redis_url);

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Stop signal received. Shutting down...");
        let _ = stop_tx.try_send(());
    })?;

    CycleOrchestrator::new(
        SnapshotFetcher::new(source),
        Publisher::new(broker),
        &config,
    )
    .run(stop_rx);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
