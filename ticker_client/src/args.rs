//! Command-line arguments for the Ticker Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use ticker_common::net::{DEFAULT_CHANNEL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REDIS_URL};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Redis URL of the pub/sub broker.
    #[clap(long, env = "TICKER_REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    /// Channel to subscribe to.
    #[clap(long, env = "TICKER_CHANNEL", default_value = DEFAULT_CHANNEL)]
    pub channel: String,

    /// Only print these symbols (comma-separated). Prints everything when omitted.
    #[clap(long)]
    pub symbols: Option<String>,

    /// Broker connection timeout in milliseconds.
    #[clap(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
}
