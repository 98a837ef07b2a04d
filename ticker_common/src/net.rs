//! Shared broker defaults used by feed and client.

/// Default Redis endpoint (the `redis` service in the compose setup).
pub const DEFAULT_REDIS_URL: &str = "redis://redis:6379";
/// Default pub/sub channel carrying ticker records.
pub const DEFAULT_CHANNEL: &str = "crypto-updates";
/// Default broker/upstream connection timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
