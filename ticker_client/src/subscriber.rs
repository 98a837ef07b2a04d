//! Receiving ticker records from the Redis channel.
//!
//! `RecordSubscriber` subscribes to the feed's channel and decodes every payload back
//! into a `CanonicalTickerRecord`. Payloads that do not decode are logged at debug level
//! and ignored.
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info};
use redis::{Client, Connection};
use rust_decimal::Decimal;
use ticker_common::{CanonicalTickerRecord, SymbolId};

use crate::error::ClientError;

/// How often the receive loop wakes up to check the shutdown flag.
const POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Subscription to one channel.
pub struct RecordSubscriber {
    conn: Connection,
    channel: String,
    filter: Option<HashSet<SymbolId>>,
}

impl RecordSubscriber {
    /// Connect to the broker at `url`.
    pub fn connect(
        url: &str,
        channel: &str,
        filter: Option<Vec<SymbolId>>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::open(url)?;
        let conn = client.get_connection_with_timeout(timeout)?;
        Ok(Self {
            conn,
            channel: channel.to_string(),
            filter: filter.map(|symbols| symbols.into_iter().collect()),
        })
    }

    /// Blocking loop that prints every matching record until `shutdown` is set.
    pub fn receive_loop(mut self, shutdown: Arc<AtomicBool>) -> Result<(), ClientError> {
        let mut pubsub = self.conn.as_pubsub();
        pubsub.subscribe(&self.channel)?;
        pubsub.set_read_timeout(Some(POLL_TIMEOUT))?;
        info!("Subscribed to channel {}", self.channel);

        while !shutdown.load(Ordering::Relaxed) {
            match pubsub.get_message() {
                Ok(msg) => {
                    let payload = msg.get_payload_bytes();
                    match CanonicalTickerRecord::from_json_slice(payload) {
                        Ok(record) if wanted(self.filter.as_ref(), &record) => {
                            info!("TICKER: {}", render(&record));
                        }
                        Ok(_) => {}
                        Err(e) => debug!(
                            "Ignoring undecodable payload ({}): {}",
                            e,
                            String::from_utf8_lossy(payload)
                        ),
                    }
                }
                Err(e) if e.is_timeout() => continue,
                Err(e) => {
                    error!("Receive data error: {}", e);
                    return Err(e.into());
                }
            }
        }

        if let Err(e) = pubsub.unsubscribe(&self.channel) {
            debug!("Unsubscribe failed: {}", e);
        }
        info!("Receiver loop stopping...");
        Ok(())
    }
}

fn wanted(filter: Option<&HashSet<SymbolId>>, record: &CanonicalTickerRecord) -> bool {
    filter.is_none_or(|symbols| symbols.contains(&record.symbol))
}

/// Human-readable line for one record; unknown values print as `n/a`.
fn render(record: &CanonicalTickerRecord) -> String {
    let time = record
        .observed_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} Volume={} Bid={} Ask={} Time={}",
        record.summary(),
        or_unknown(record.volume),
        or_unknown(record.bid),
        or_unknown(record.ask),
        time
    )
}

fn or_unknown(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(symbol: &str) -> CanonicalTickerRecord {
        CanonicalTickerRecord::new(symbol.parse().unwrap(), dec!(100.5))
    }

    #[test]
    fn renders_known_and_unknown_values() {
        let mut rec = record("BTC/USDT");
        rec.timestamp = Some(1_718_000_000_123);
        rec.bid = Some(dec!(100.4));
        assert_eq!(
            render(&rec),
            "BTC/USDT Price: 100.5 Change: n/a (n/a%) Volume=n/a Bid=100.4 Ask=n/a \
             Time=2024-06-10 06:13:20.123 UTC"
        );
    }

    #[test]
    fn filter_limits_symbols() {
        let filter: HashSet<SymbolId> = ["ETH/USDT".parse().unwrap()].into_iter().collect();
        assert!(wanted(Some(&filter), &record("ETH/USDT")));
        assert!(!wanted(Some(&filter), &record("BTC/USDT")));
        assert!(wanted(None, &record("BTC/USDT")));
    }
}
