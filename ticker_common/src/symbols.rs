//! Market symbol identifiers and helpers for parsing them from files and CLI.
//!
//! A `SymbolId` is a unified `BASE/QUOTE` pair such as `BTC/USDT`. Venues address
//! the same market by the concatenated code (`BTCUSDT`), see [`SymbolId::exchange_code`].
use std::collections::HashSet;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TickerError;

/// Unified market identifier, always upper-case `BASE/QUOTE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolId {
    pair: String,
    split: usize,
}

impl SymbolId {
    /// Base asset, e.g. `BTC` for `BTC/USDT`.
    pub fn base(&self) -> &str {
        &self.pair[..self.split]
    }

    /// Quote asset, e.g. `USDT` for `BTC/USDT`.
    pub fn quote(&self) -> &str {
        &self.pair[self.split + 1..]
    }

    /// Venue code used by REST APIs that drop the separator (`BTCUSDT`).
    pub fn exchange_code(&self) -> String {
        format!("{}{}", self.base(), self.quote())
    }

    /// Unified `BASE/QUOTE` form.
    pub fn as_str(&self) -> &str {
        &self.pair
    }
}

impl FromStr for SymbolId {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || TickerError::InvalidSymbol(trimmed.to_string());

        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (base, quote) = trimmed.split_once('/').ok_or_else(invalid)?;
        if base.is_empty() || quote.is_empty() || quote.contains('/') {
            return Err(invalid());
        }

        Ok(SymbolId {
            pair: format!("{}/{}", base.to_ascii_uppercase(), quote.to_ascii_uppercase()),
            split: base.len(),
        })
    }
}

impl TryFrom<String> for SymbolId {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SymbolId> for String {
    fn from(value: SymbolId) -> Self {
        value.pair
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pair)
    }
}

/// Trait providing file parsing for symbol lists.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, spaces, or new lines. Blank entries are
    /// skipped and duplicates are dropped, keeping the first occurrence.
    fn parse_symbols<R: BufRead>(reader: R) -> Result<Vec<SymbolId>, TickerError>;
}

impl SymbolParser for SymbolId {
    fn parse_symbols<R: BufRead>(reader: R) -> Result<Vec<Self>, TickerError> {
        let mut symbols = Vec::new();
        let mut seen = HashSet::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(TickerError::Io)?;
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                match token.parse::<Self>() {
                    Ok(symbol) => {
                        if seen.insert(symbol.clone()) {
                            symbols.push(symbol);
                        }
                    }
                    Err(e) => return Err(TickerError::ParseSymbolsFile(e.to_string())),
                }
            }
        }
        Ok(symbols)
    }
}

/// Parse a comma-separated symbol list as given on the command line.
pub fn parse_symbol_list(raw: &str) -> crate::Result<Vec<SymbolId>> {
    SymbolId::parse_symbols(raw.as_bytes())
}
