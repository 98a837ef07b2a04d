//! Redis pub/sub transport.

use std::time::Duration;

use log::{debug, info};
use redis::{Client, Commands, Connection, RedisResult};

use super::PubSub;
use crate::error::{TransportError, is_connection_fault};

/// Synchronous Redis publisher with lazy reconnect.
///
/// A dropped connection fails the current publish; the next publish opens a new one.
pub struct RedisPubSub {
    client: Client,
    timeout: Duration,
    conn: Option<Connection>,
}

impl RedisPubSub {
    /// Open a connection to `url` and verify it with `PING`.
    pub fn connect(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::open(url)?;
        let mut conn = open(&client, timeout)?;
        let pong: String = redis::cmd("PING").query(&mut conn)?;
        debug!("Redis answered {} at {}", pong, url);

        Ok(Self {
            client,
            timeout,
            conn: Some(conn),
        })
    }
}

fn open(client: &Client, timeout: Duration) -> RedisResult<Connection> {
    let conn = client.get_connection_with_timeout(timeout)?;
    conn.set_read_timeout(Some(timeout))?;
    conn.set_write_timeout(Some(timeout))?;
    Ok(conn)
}

impl PubSub for RedisPubSub {
    fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<(), TransportError> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                info!("Reconnecting to Redis");
                open(&self.client, self.timeout)?
            }
        };

        match conn.publish::<_, _, i64>(channel, payload) {
            Ok(receivers) => {
                debug!("Published {} bytes to {} ({} receivers)", payload.len(), channel, receivers);
                self.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                if !is_connection_fault(&e) {
                    self.conn = Some(conn);
                }
                Err(e.into())
            }
        }
    }

    fn close(&mut self) {
        if self.conn.take().is_some() {
            info!("Redis connection closed");
        }
    }
}
