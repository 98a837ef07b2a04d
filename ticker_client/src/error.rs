//! Client error type.
use thiserror::Error;
use ticker_common::TickerError;

/// Everything that can stop the client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Broker connection or subscription failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Shared helper failed (symbol list, record decoding).
    #[error(transparent)]
    Common(#[from] TickerError),

    /// Ctrl+C handler could not be installed.
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}
