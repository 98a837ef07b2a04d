//! Canonical ticker record and JSON encoding helpers.
//!
//! A `CanonicalTickerRecord` is the payload published for one symbol per cycle. Every
//! numeric value is a `Decimal` serialized as a JSON string, so consumers decode exactly
//! what was published. Optional values are always present on the wire: an unknown
//! value is `null`, never omitted and never replaced by zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::result::Result;
use crate::symbols::SymbolId;

/// Normalized market ticker for a single symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTickerRecord {
    /// Unified symbol identifier.
    pub symbol: SymbolId,
    /// Last traded price.
    pub price: Decimal,
    /// Upstream snapshot time in milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    /// Quote-denominated volume over the trailing window.
    pub volume: Option<Decimal>,
    /// Opening price of the trailing 24h window.
    #[serde(rename = "open24h")]
    pub open_24h: Option<Decimal>,
    /// Highest price of the trailing 24h window.
    #[serde(rename = "high24h")]
    pub high_24h: Option<Decimal>,
    /// Lowest price of the trailing 24h window.
    #[serde(rename = "low24h")]
    pub low_24h: Option<Decimal>,
    /// Absolute price change over the window.
    pub change: Option<Decimal>,
    /// Percentage price change over the window.
    pub percentage: Option<Decimal>,
    /// Best bid.
    pub bid: Option<Decimal>,
    /// Best ask.
    pub ask: Option<Decimal>,
}

impl CanonicalTickerRecord {
    /// Record with only the required fields set; everything else is unknown.
    pub fn new(symbol: SymbolId, price: Decimal) -> Self {
        Self {
            symbol,
            price,
            timestamp: None,
            volume: None,
            open_24h: None,
            high_24h: None,
            low_24h: None,
            change: None,
            percentage: None,
            bid: None,
            ask: None,
        }
    }

    /// Upstream snapshot time as a UTC datetime, if known and representable.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }

    /// One-line operator summary: price, signed change and signed percentage.
    pub fn summary(&self) -> String {
        format!(
            "{} Price: {} Change: {} ({}%)",
            self.symbol,
            self.price,
            signed(self.change),
            signed(self.percentage)
        )
    }

    /// Encode the record to JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        Ok(json)
    }

    /// Decode a record from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn signed(value: Option<Decimal>) -> String {
    match value {
        Some(v) if v.is_sign_negative() => v.to_string(),
        Some(v) => format!("+{}", v),
        None => "n/a".to_string(),
    }
}
