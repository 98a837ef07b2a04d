//! Ticker Client — subscribes to the feed's Redis channel and prints every decoded
//! ticker record.
//!
//! Usage example (CLI):
//! ```bash
//! ticker_client --redis-url redis://localhost:6379 --channel crypto-updates --symbols BTC/USDT,ETH/USDT
//! ```
//!
//! Without `--symbols` every record on the channel is printed.
#![warn(missing_docs)]
mod args;
mod error;
mod subscriber;

use std::process::ExitCode;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use ticker_common::symbols::parse_symbol_list;

use crate::args::Args;
use crate::error::ClientError;
use crate::subscriber::RecordSubscriber;

fn main() -> ExitCode {
    init_logger();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ClientError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })?;
    }

    let filter = args
        .symbols
        .as_deref()
        .map(parse_symbol_list)
        .transpose()?;
    if let Some(symbols) = &filter {
        info!("Symbols: {:?}", symbols.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    }

    info!("Connecting to Redis at {}", args.redis_url);
    let subscriber = RecordSubscriber::connect(
        &args.redis_url,
        &args.channel,
        filter,
        Duration::from_millis(args.connect_timeout_ms),
    )?;

    info!("Client is running. Press Ctrl+C to exit.");
    subscriber.receive_loop(shutdown)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
