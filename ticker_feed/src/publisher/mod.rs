//! Publisher adapter.
//!
//! `PubSub` is the seam to the broker: fire-and-forget `publish(channel, bytes)` plus an
//! explicit `close`. `Publisher` serializes a `CanonicalTickerRecord` and hands it over,
//! turning every failure into a `PublishFailure` the orchestrator can log and skip.

pub mod redis_client;

use ticker_common::CanonicalTickerRecord;

use crate::error::{PublishFailure, TransportError};

/// Broker capability: publish a byte payload to a named channel.
pub trait PubSub: Send {
    /// Send `payload` to `channel`. No delivery acknowledgement is implied.
    fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Release the broker connection.
    fn close(&mut self) {}
}

/// Serializes records and publishes them through a `PubSub` handle.
pub struct Publisher<P> {
    transport: P,
}

impl<P: PubSub> Publisher<P> {
    /// Wrap `transport`.
    pub fn new(transport: P) -> Self {
        Self { transport }
    }

    /// Encode `record` and publish it on `channel`.
    pub fn publish(
        &mut self,
        channel: &str,
        record: &CanonicalTickerRecord,
    ) -> Result<(), PublishFailure> {
        let payload = record.to_json_bytes()?;
        self.transport.publish(channel, &payload)?;
        Ok(())
    }

    /// Close the underlying transport.
    pub fn close(&mut self) {
        self.transport.close();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingPubSub;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn publishes_serialized_record_on_channel() {
        let broker = RecordingPubSub::default();
        let mut publisher = Publisher::new(broker.clone());
        let record = CanonicalTickerRecord::new("BTC/USDT".parse().unwrap(), dec!(64000.1));

        publisher.publish("crypto-updates", &record).unwrap();

        let sent = broker.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "crypto-updates");
        assert_eq!(CanonicalTickerRecord::from_json_slice(&sent[0].1).unwrap(), record);
    }

    #[test]
    fn transport_error_becomes_publish_failure() {
        let broker = RecordingPubSub::failing_for(&["ETH/USDT"]);
        let mut publisher = Publisher::new(broker);
        let record = CanonicalTickerRecord::new("ETH/USDT".parse().unwrap(), dec!(1));

        let err = publisher.publish("crypto-updates", &record).unwrap_err();
        assert!(matches!(err, PublishFailure::Transport(TransportError::Connection(_))));
    }

    #[test]
    fn close_reaches_transport() {
        let broker = RecordingPubSub::default();
        let mut publisher = Publisher::new(broker.clone());
        publisher.close();
        assert!(broker.is_closed());
    }
}
