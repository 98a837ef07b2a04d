//! Failure taxonomy of the feed.
//!
//! Only `StartupFailure` ends the process. Every other error is scoped to one cycle
//! (`FetchFailure`) or one symbol (`ValidationFailure`, `PublishFailure`) and is
//! logged by the orchestrator before the loop moves on.
use std::fmt;

use thiserror::Error;
use ticker_common::TickerError;

/// Collaborator could not be set up; the loop never starts.
#[derive(Error, Debug)]
pub enum StartupFailure {
    /// Configuration was missing or inconsistent.
    #[error("configuration: {0}")]
    Config(String),

    /// Shared helper failed while reading configuration input.
    #[error("configuration: {0}")]
    Common(#[from] TickerError),

    /// Upstream quote source could not be constructed or reached.
    #[error("upstream quote source: {0}")]
    Upstream(String),

    /// Pub/sub broker could not be constructed or reached.
    #[error("pub/sub broker: {0}")]
    PubSub(String),

    /// The stop-signal handler could not be installed.
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Classification of a failed batch fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    /// Connectivity or timeout problem.
    Network,
    /// Upstream rejected the request (bad symbol, venue-side error).
    Upstream,
    /// Anything else, including a crashed fetch worker.
    Unknown,
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchFailureKind::Network => "network",
            FetchFailureKind::Upstream => "upstream",
            FetchFailureKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Whole-cycle fetch failure. No partial data accompanies it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} fetch failure: {message}")]
pub struct FetchFailure {
    /// Failure class.
    pub kind: FetchFailureKind,
    /// Underlying message, kept for logging.
    pub message: String,
}

impl FetchFailure {
    /// Build a failure of the given kind.
    pub fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Error reported by a `QuoteSource` implementation in its own terms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Could not reach the venue or the call timed out.
    #[error("connectivity: {0}")]
    Connectivity(String),
    /// Venue answered with a protocol-level rejection.
    #[error("rejected: {0}")]
    Rejected(String),
    /// Unexpected fault.
    #[error("{0}")]
    Other(String),
}

/// A raw snapshot could not be turned into a publishable record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// A required value was absent or not a finite number.
    #[error("missing required field '{field}'")]
    MissingRequiredField {
        /// Name of the wire field.
        field: &'static str,
    },
}

/// Transport-level publish error reported by a `PubSub` implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Broker connection dropped or could not be established.
    #[error("connection: {0}")]
    Connection(String),
    /// Broker refused the command.
    #[error("broker: {0}")]
    Broker(String),
}

/// True when `err` means the broker connection is unusable and must be reopened.
pub fn is_connection_fault(err: &redis::RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_timeout()
}

impl From<redis::RedisError> for TransportError {
    fn from(err: redis::RedisError) -> Self {
        if is_connection_fault(&err) {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Broker(err.to_string())
        }
    }
}

/// A single record could not be handed to the broker.
#[derive(Error, Debug)]
pub enum PublishFailure {
    /// Record could not be serialized.
    #[error("encode: {0}")]
    Encode(#[from] TickerError),
    /// Broker send failed.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failure_message_names_the_kind() {
        let failure = FetchFailure::new(FetchFailureKind::Network, "timed out");
        assert_eq!(failure.to_string(), "network fetch failure: timed out");
    }

    #[test]
    fn validation_failure_names_the_field() {
        let failure = ValidationFailure::MissingRequiredField { field: "price" };
        assert_eq!(failure.to_string(), "missing required field 'price'");
    }

    #[test]
    fn dropped_socket_is_a_connection_fault() {
        let err = redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ));
        assert!(is_connection_fault(&err));
        assert!(matches!(TransportError::from(err), TransportError::Connection(_)));

        let err = redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "read timed out",
        ));
        assert!(is_connection_fault(&err));
    }

    #[test]
    fn broker_refusal_keeps_the_connection() {
        let err = redis::RedisError::from((redis::ErrorKind::ResponseError, "WRONGTYPE"));
        assert!(!is_connection_fault(&err));
        assert!(matches!(TransportError::from(err), TransportError::Broker(_)));
    }
}
