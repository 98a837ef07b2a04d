//! Binance-family REST quote source.
//!
//! One `GET /api/v3/ticker/24hr?symbols=[...]` per cycle covers every configured
//! symbol. Response entries are matched back to the requested `SymbolId`s through
//! their venue code (`BTC/USDT` <-> `BTCUSDT`).

use std::collections::HashMap;
use std::time::Duration;

use clap::ValueEnum;
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use strum::{Display, EnumString};
use ticker_common::SymbolId;

use super::QuoteSource;
use crate::error::SourceError;
use crate::model::snapshot::RawSnapshot;

/// Supported venues speaking the Binance spot REST dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[value(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Exchange {
    /// binance.us
    BinanceUs,
    /// binance.com
    Binance,
}

impl Exchange {
    /// Default REST base URL.
    pub fn base_url(&self) -> &'static str {
        match self {
            Exchange::BinanceUs => "https://api.binance.us",
            Exchange::Binance => "https://api.binance.com",
        }
    }
}

/// 24h rolling-window ticker as returned by the venue.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    last_price: Option<String>,
    close_time: Option<i64>,
    quote_volume: Option<String>,
    open_price: Option<String>,
    high_price: Option<String>,
    low_price: Option<String>,
    price_change: Option<String>,
    price_change_percent: Option<String>,
    bid_price: Option<String>,
    ask_price: Option<String>,
}

/// Error body the venue sends with 4xx answers.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Blocking REST client for one venue.
pub struct BinanceSource {
    client: Client,
    base_url: String,
    exchange: Exchange,
}

impl BinanceSource {
    /// Build a client for `exchange`, optionally overriding its base URL.
    ///
    /// `timeout` bounds both connecting and the whole request.
    pub fn new(
        exchange: Exchange,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Other(format!("failed to build HTTP client: {}", e)))?;
        let base_url = base_url
            .unwrap_or_else(|| exchange.base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            exchange,
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, &body))
        }
    }
}

impl QuoteSource for BinanceSource {
    fn name(&self) -> &str {
        match self.exchange {
            Exchange::BinanceUs => "binanceus",
            Exchange::Binance => "binance",
        }
    }

    fn fetch_tickers(
        &self,
        symbols: &[SymbolId],
    ) -> Result<HashMap<SymbolId, RawSnapshot>, SourceError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }
        let codes: Vec<String> = symbols.iter().map(SymbolId::exchange_code).collect();
        let param = serde_json::to_string(&codes).map_err(|e| SourceError::Other(e.to_string()))?;

        let body = self.get("/api/v3/ticker/24hr", &[("symbols", param)])?;
        let tickers: Vec<Ticker24h> = serde_json::from_str(&body)
            .map_err(|e| SourceError::Other(format!("undecodable ticker response: {}", e)))?;
        Ok(into_snapshots(tickers, symbols))
    }

    fn probe(&self) -> Result<(), SourceError> {
        self.get("/api/v3/ping", &[]).map(|_| ())
    }
}

fn into_snapshots(tickers: Vec<Ticker24h>, requested: &[SymbolId]) -> HashMap<SymbolId, RawSnapshot> {
    let by_code: HashMap<String, &SymbolId> = requested
        .iter()
        .map(|symbol| (symbol.exchange_code(), symbol))
        .collect();

    let mut snapshots = HashMap::with_capacity(tickers.len());
    for ticker in tickers {
        let Some(&symbol) = by_code.get(&ticker.symbol) else {
            debug!("Venue returned unrequested code {}", ticker.symbol);
            continue;
        };
        snapshots.insert(
            symbol.clone(),
            RawSnapshot {
                symbol: Some(symbol.clone()),
                last: ticker.last_price,
                timestamp: ticker.close_time,
                quote_volume: ticker.quote_volume,
                open: ticker.open_price,
                high: ticker.high_price,
                low: ticker.low_price,
                change: ticker.price_change,
                percentage: ticker.price_change_percent,
                bid: ticker.bid_price,
                ask: ticker.ask_price,
            },
        );
    }
    snapshots
}

fn transport_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        SourceError::Connectivity(err.to_string())
    } else {
        SourceError::Other(err.to_string())
    }
}

/// Rate limiting (429/418) and 5xx mean the venue is unavailable, which is treated as
/// a connectivity problem; any other error status is a rejection of the request.
fn status_error(status: StatusCode, body: &str) -> SourceError {
    let detail = match serde_json::from_str::<ApiError>(body) {
        Ok(api) => format!("HTTP {} (code {}): {}", status.as_u16(), api.code, api.msg),
        Err(_) => format!("HTTP {}", status.as_u16()),
    };

    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::IM_A_TEAPOT
    {
        SourceError::Connectivity(detail)
    } else {
        SourceError::Rejected(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"[
        {"symbol":"BTCUSDT","priceChange":"-120.50","priceChangePercent":"-0.188",
         "lastPrice":"64000.10","bidPrice":"64000.00","askPrice":"64000.20",
         "openPrice":"64120.60","highPrice":"65010.00","lowPrice":"63500.00",
         "volume":"12.5","quoteVolume":"800000.25","openTime":1717913600000,
         "closeTime":1718000000000,"count":1200},
        {"symbol":"ETHUSDT","lastPrice":null,"closeTime":1718000000001},
        {"symbol":"XRPUSDT","lastPrice":"0.5"}
    ]"#;

    fn requested() -> Vec<SymbolId> {
        ["BTC/USDT", "ETH/USDT"].iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn maps_venue_codes_back_to_symbols() {
        let tickers: Vec<Ticker24h> = serde_json::from_str(RESPONSE).unwrap();
        let snapshots = into_snapshots(tickers, &requested());

        assert_eq!(snapshots.len(), 2);
        let btc = &snapshots[&"BTC/USDT".parse::<SymbolId>().unwrap()];
        assert_eq!(btc.last.as_deref(), Some("64000.10"));
        assert_eq!(btc.quote_volume.as_deref(), Some("800000.25"));
        assert_eq!(btc.percentage.as_deref(), Some("-0.188"));
        assert_eq!(btc.timestamp, Some(1_718_000_000_000));

        let eth = &snapshots[&"ETH/USDT".parse::<SymbolId>().unwrap()];
        assert_eq!(eth.last, None);
        assert_eq!(eth.bid, None);
    }

    #[test]
    fn rejection_carries_venue_message() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":-1121,"msg":"Invalid symbol."}"#,
        );
        assert_eq!(
            err,
            SourceError::Rejected("HTTP 400 (code -1121): Invalid symbol.".into())
        );
    }

    #[test]
    fn unavailable_venue_is_connectivity() {
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            SourceError::Connectivity(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            SourceError::Connectivity(_)
        ));
        assert!(matches!(
            status_error(StatusCode::IM_A_TEAPOT, ""),
            SourceError::Connectivity(_)
        ));
    }

    #[test]
    fn status_classes_map_to_failure_kinds() {
        use crate::error::FetchFailureKind;
        use crate::fetcher::classify;

        let unavailable = classify(status_error(StatusCode::BAD_GATEWAY, ""));
        assert_eq!(unavailable.kind, FetchFailureKind::Network);
        let limited = classify(status_error(StatusCode::TOO_MANY_REQUESTS, ""));
        assert_eq!(limited.kind, FetchFailureKind::Network);
        let refused = classify(status_error(StatusCode::FORBIDDEN, ""));
        assert_eq!(refused.kind, FetchFailureKind::Upstream);
    }

    #[test]
    fn exchange_names_and_urls() {
        assert_eq!(Exchange::BinanceUs.to_string(), "binanceus");
        assert_eq!("BinanceUS".parse::<Exchange>().unwrap(), Exchange::BinanceUs);
        assert_eq!(Exchange::Binance.base_url(), "https://api.binance.com");
    }

    #[test]
    fn trims_trailing_slash_from_override() {
        let source = BinanceSource::new(
            Exchange::Binance,
            Some("http://localhost:9000/".into()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(source.base_url, "http://localhost:9000");
        assert_eq!(source.name(), "binance");
    }
}
