//!
//! Common types and utilities shared by the ticker feed and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `TickerError` used across the workspace.
//! - `result` — handy `Result<T, TickerError>` alias.
//! - `symbols` — market symbol identifiers and list parsing helpers.
//! - `record` — the normalized `CanonicalTickerRecord` published on the channel.
//! - `net` — default broker endpoint and channel name.
#![warn(missing_docs)]
pub mod error;
pub mod net;
pub mod record;
pub mod result;
pub mod symbols;

pub use error::TickerError;
pub use record::CanonicalTickerRecord;
pub use result::Result;
pub use symbols::SymbolId;
