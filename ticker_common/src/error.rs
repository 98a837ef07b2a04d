//! Error types shared between the feed and the client.
//!
//! `TickerError` covers the failures of the shared helpers: reading symbol
//! lists, validating identifiers and encoding/decoding wire records.
use std::io;

use thiserror::Error;

/// Unified error type shared by feed and client.
#[derive(Error, Debug)]
pub enum TickerError {
    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A symbol identifier did not have the `BASE/QUOTE` shape.
    #[error("Invalid symbol '{0}': expected BASE/QUOTE")]
    InvalidSymbol(String),

    /// Error while parsing a symbols file into `SymbolId` values.
    #[error("Parse symbols file error: {0}")]
    ParseSymbolsFile(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
