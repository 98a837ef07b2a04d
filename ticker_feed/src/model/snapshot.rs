//! Raw per-symbol ticker snapshot.
//!
//! Values are kept exactly as the upstream sent them. Decimal fields stay strings and
//! any of them may be missing; the normalizer decides what is usable.

use ticker_common::SymbolId;

/// One symbol's ticker values as delivered by the quote source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    /// Symbol the snapshot belongs to, if the source could attribute it.
    pub symbol: Option<SymbolId>,
    /// Last traded price.
    pub last: Option<String>,
    /// Snapshot time in epoch milliseconds.
    pub timestamp: Option<i64>,
    /// Quote-denominated volume.
    pub quote_volume: Option<String>,
    /// 24h open.
    pub open: Option<String>,
    /// 24h high.
    pub high: Option<String>,
    /// 24h low.
    pub low: Option<String>,
    /// Absolute change over the window.
    pub change: Option<String>,
    /// Percentage change over the window.
    pub percentage: Option<String>,
    /// Best bid.
    pub bid: Option<String>,
    /// Best ask.
    pub ask: Option<String>,
}

impl RawSnapshot {
    /// Empty snapshot attributed to `symbol`.
    #[cfg(test)]
    pub fn for_symbol(symbol: SymbolId) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::default()
        }
    }
}
