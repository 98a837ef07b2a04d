//! Raw snapshot to canonical record conversion.
//!
//! Pure: no I/O and no shared state. `symbol` and `price` are required; every other
//! value that is absent or unreadable becomes unknown (`None`) instead of zero.

use std::str::FromStr;

use chrono::DateTime;
use log::debug;
use rust_decimal::Decimal;
use ticker_common::CanonicalTickerRecord;

use crate::error::ValidationFailure;
use crate::model::snapshot::RawSnapshot;

/// Convert one raw snapshot into a publishable record.
pub fn normalize(raw: &RawSnapshot) -> Result<CanonicalTickerRecord, ValidationFailure> {
    let symbol = raw
        .symbol
        .clone()
        .ok_or(ValidationFailure::MissingRequiredField { field: "symbol" })?;
    let price = match raw.last.as_deref() {
        Some(text) => parse_decimal(text).or_else(|| {
            debug!("{}: unreadable price {:?}", symbol, text);
            None
        }),
        None => None,
    }
    .ok_or(ValidationFailure::MissingRequiredField { field: "price" })?;

    let optional = |field: &str, value: &Option<String>| -> Option<Decimal> {
        let text = value.as_deref()?;
        let parsed = parse_decimal(text);
        if parsed.is_none() {
            debug!("{}: unreadable {} value {:?}, treating as unknown", symbol, field, text);
        }
        parsed
    };

    Ok(CanonicalTickerRecord {
        timestamp: raw
            .timestamp
            .filter(|ms| DateTime::from_timestamp_millis(*ms).is_some()),
        volume: optional("volume", &raw.quote_volume),
        open_24h: optional("open24h", &raw.open),
        high_24h: optional("high24h", &raw.high),
        low_24h: optional("low24h", &raw.low),
        change: optional("change", &raw.change),
        percentage: optional("percentage", &raw.percentage),
        bid: optional("bid", &raw.bid),
        ask: optional("ask", &raw.ask),
        price,
        symbol,
    })
}

/// Parse a finite decimal; accepts plain and scientific notation.
///
/// Magnitudes beyond `Decimal::MAX` (about 7.9e28) or needing more than 28
/// fractional digits do not fit a `Decimal` and read as unparsable.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use ticker_common::SymbolId;

    fn raw(last: Option<&str>) -> RawSnapshot {
        let mut raw = RawSnapshot::for_symbol("BTC/USDT".parse::<SymbolId>().unwrap());
        raw.last = last.map(str::to_string);
        raw
    }

    #[test]
    fn copies_every_documented_field() {
        let mut snapshot = raw(Some("64000.10"));
        snapshot.timestamp = Some(1_718_000_000_000);
        snapshot.quote_volume = Some("800000.25".into());
        snapshot.open = Some("64120.60".into());
        snapshot.high = Some("65010".into());
        snapshot.low = Some("63500".into());
        snapshot.change = Some("-120.50".into());
        snapshot.percentage = Some("-0.188".into());
        snapshot.bid = Some("64000.00".into());
        snapshot.ask = Some("64000.20".into());

        let record = normalize(&snapshot).unwrap();
        assert_eq!(record.symbol.as_str(), "BTC/USDT");
        assert_eq!(record.price, dec!(64000.10));
        assert_eq!(record.timestamp, Some(1_718_000_000_000));
        assert_eq!(record.volume, Some(dec!(800000.25)));
        assert_eq!(record.open_24h, Some(dec!(64120.60)));
        assert_eq!(record.high_24h, Some(dec!(65010)));
        assert_eq!(record.low_24h, Some(dec!(63500)));
        assert_eq!(record.change, Some(dec!(-120.50)));
        assert_eq!(record.percentage, Some(dec!(-0.188)));
        assert_eq!(record.bid, Some(dec!(64000.00)));
        assert_eq!(record.ask, Some(dec!(64000.20)));
    }

    #[test]
    fn missing_optionals_stay_unknown() {
        let record = normalize(&raw(Some("1.5"))).unwrap();
        assert_eq!(record, CanonicalTickerRecord::new(record.symbol.clone(), dec!(1.5)));
        assert_eq!(record.change, None);
        assert_eq!(record.volume, None);
    }

    #[test]
    fn real_zero_change_is_kept() {
        let mut snapshot = raw(Some("10"));
        snapshot.change = Some("0.00".into());
        assert_eq!(normalize(&snapshot).unwrap().change, Some(dec!(0)));
    }

    #[test]
    fn rejects_absent_or_unusable_price() {
        for last in [None, Some(""), Some("  "), Some("NaN"), Some("inf"), Some("-Infinity"), Some("abc")] {
            assert_eq!(
                normalize(&raw(last)),
                Err(ValidationFailure::MissingRequiredField { field: "price" }),
                "{last:?}"
            );
        }
    }

    #[test]
    fn rejects_price_beyond_decimal_range() {
        assert_eq!(
            normalize(&raw(Some("1e30"))),
            Err(ValidationFailure::MissingRequiredField { field: "price" })
        );
        assert!(normalize(&raw(Some("7.9e28"))).is_ok());
    }

    #[test]
    fn rejects_unattributed_snapshot() {
        let snapshot = RawSnapshot {
            last: Some("1".into()),
            ..RawSnapshot::default()
        };
        assert_eq!(
            normalize(&snapshot),
            Err(ValidationFailure::MissingRequiredField { field: "symbol" })
        );
    }

    #[test]
    fn unreadable_optional_becomes_unknown() {
        let mut snapshot = raw(Some("2"));
        snapshot.bid = Some("NaN".into());
        snapshot.ask = Some("1.2e3".into());
        let record = normalize(&snapshot).unwrap();
        assert_eq!(record.bid, None);
        assert_eq!(record.ask, Some(dec!(1200)));
    }

    #[test]
    fn out_of_range_timestamp_is_unknown() {
        let mut snapshot = raw(Some("2"));
        snapshot.timestamp = Some(i64::MAX);
        assert_eq!(normalize(&snapshot).unwrap().timestamp, None);
    }
}
