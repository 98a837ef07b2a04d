//! Command-line and environment configuration for the feed.
//!
//! `Args` is the raw `clap` surface; `FeedConfig::from_args` validates it into the
//! immutable configuration the rest of the process reads.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use ticker_common::{SymbolId, TickerError};
use ticker_common::net::{DEFAULT_CHANNEL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REDIS_URL};
use ticker_common::symbols::{SymbolParser, parse_symbol_list};

use crate::error::StartupFailure;
use crate::fetcher::binance::Exchange;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Venue to poll.
    #[clap(long, env = "TICKER_EXCHANGE", value_enum, default_value_t = Exchange::BinanceUs)]
    pub exchange: Exchange,

    /// Override the venue's REST base URL.
    #[clap(long, env = "TICKER_EXCHANGE_URL")]
    pub exchange_url: Option<String>,

    /// Comma-separated symbols to poll, e.g. `BTC/USDT,ETH/USDT`.
    #[clap(long, env = "TICKER_SYMBOLS", default_value = "BTC/USDT,ETH/USDT,SPX/USDT")]
    pub symbols: String,

    /// Path to a text file with symbols; takes precedence over `--symbols`.
    /// Symbols may be separated by commas, spaces, or new lines.
    #[clap(long, env = "TICKER_SYMBOLS_FILE")]
    pub symbols_file: Option<String>,

    /// Poll interval in milliseconds, measured from the start of each fetch.
    #[clap(long, env = "TICKER_POLL_INTERVAL_MS", default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Redis URL of the pub/sub broker.
    #[clap(long, env = "TICKER_REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    /// Channel the records are published on.
    #[clap(long, env = "TICKER_CHANNEL", default_value = DEFAULT_CHANNEL)]
    pub channel: String,

    /// Connection timeout for the venue and the broker, in milliseconds.
    #[clap(long, env = "TICKER_CONNECT_TIMEOUT_MS", default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
}

/// Process-wide configuration, fixed at startup.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Venue to poll.
    pub exchange: Exchange,
    /// Optional REST base URL override.
    pub exchange_url: Option<String>,
    /// Ordered, duplicate-free symbols to poll.
    pub symbols: Vec<SymbolId>,
    /// Cycle cadence.
    pub poll_interval: Duration,
    /// Broker URL.
    pub redis_url: String,
    /// Target channel.
    pub channel: String,
    /// Connection timeout for both collaborators.
    pub connect_timeout: Duration,
}

impl FeedConfig {
    /// Validate raw arguments.
    pub fn from_args(args: Args) -> Result<Self, StartupFailure> {
        let symbols = match &args.symbols_file {
            Some(raw) => read_symbols_file(&normalize_path(raw))?,
            None => parse_symbol_list(&args.symbols)?,
        };
        if symbols.is_empty() {
            return Err(StartupFailure::Config("no symbols configured".into()));
        }
        if args.poll_interval_ms == 0 {
            return Err(StartupFailure::Config("poll interval must be positive".into()));
        }
        if args.connect_timeout_ms == 0 {
            return Err(StartupFailure::Config("connect timeout must be positive".into()));
        }
        let channel = args.channel.trim().to_string();
        if channel.is_empty() {
            return Err(StartupFailure::Config("channel name is empty".into()));
        }

        Ok(Self {
            exchange: args.exchange,
            exchange_url: args.exchange_url.filter(|url| !url.trim().is_empty()),
            symbols,
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            redis_url: args.redis_url,
            channel,
            connect_timeout: Duration::from_millis(args.connect_timeout_ms),
        })
    }
}

fn read_symbols_file(path: &Path) -> Result<Vec<SymbolId>, StartupFailure> {
    if !path.is_file() {
        return Err(StartupFailure::Config(format!(
            "symbols file {} does not exist",
            path.display()
        )));
    }
    let file = File::open(path).map_err(TickerError::Io)?;
    Ok(SymbolId::parse_symbols(BufReader::new(file))?)
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(extra: &[&str]) -> Result<FeedConfig, StartupFailure> {
        let mut argv = vec!["ticker_feed"];
        argv.extend_from_slice(extra);
        FeedConfig::from_args(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn explicit_flags_are_applied() {
        let config = parse(&[
            "--exchange",
            "binance",
            "--symbols",
            "btc/usdt,ETH/USDT",
            "--poll-interval-ms",
            "250",
            "--redis-url",
            "redis://localhost:6379",
            "--channel",
            "ticks",
            "--connect-timeout-ms",
            "1500",
        ])
        .unwrap();
        assert_eq!(config.exchange, Exchange::Binance);
        let names: Vec<&str> = config.symbols.iter().map(SymbolId::as_str).collect();
        assert_eq!(names, ["BTC/USDT", "ETH/USDT"]);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.channel, "ticks");
        assert_eq!(config.connect_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = parse(&["--poll-interval-ms", "0"]).unwrap_err();
        assert!(matches!(err, StartupFailure::Config(_)));
    }

    #[test]
    fn rejects_blank_channel_and_symbols() {
        assert!(matches!(
            parse(&["--channel", "  "]).unwrap_err(),
            StartupFailure::Config(_)
        ));
        assert!(matches!(
            parse(&["--symbols", " , "]).unwrap_err(),
            StartupFailure::Config(_)
        ));
        assert!(matches!(
            parse(&["--symbols", "BTCUSDT"]).unwrap_err(),
            StartupFailure::Common(_)
        ));
    }

    #[test]
    fn symbols_file_overrides_list() {
        let path = std::env::temp_dir().join(format!("ticker_feed_symbols_{}.txt", std::process::id()));
        let mut file = File::create(&path).unwrap();
        writeln!(file, "SOL/USDT\nADA/USDT, SOL/USDT").unwrap();

        let quoted = format!("\"{}\"", path.display());
        let config = parse(&["--symbols-file", &quoted, "--symbols", "BTC/USDT"]).unwrap();
        let names: Vec<&str> = config.symbols.iter().map(SymbolId::as_str).collect();
        assert_eq!(names, ["SOL/USDT", "ADA/USDT"]);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_symbols_file_is_config_failure() {
        let err = parse(&["--symbols-file", "/definitely/not/here.txt"]).unwrap_err();
        assert!(matches!(err, StartupFailure::Config(_)));
    }

    #[test]
    fn strips_quotes_from_paths() {
        assert_eq!(normalize_path("  \"C:\\tmp\\s.txt\" "), PathBuf::from("C:\\tmp\\s.txt"));
        assert_eq!(normalize_path("plain.txt"), PathBuf::from("plain.txt"));
    }
}
