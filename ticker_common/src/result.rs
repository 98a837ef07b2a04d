//! Result type alias shared across the workspace.
//!
//! Functions can simply return `Result<T>` and get `TickerError` as the error type.
use crate::error::TickerError;

/// Workspace-wide `Result` alias with `TickerError` as the default error.
pub type Result<T, E = TickerError> = std::result::Result<T, E>;
