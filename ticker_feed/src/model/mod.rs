//! Domain models owned by the feed.
//!
//! - `snapshot` — uninterpreted per-symbol values as returned by the upstream source.
//! - `cycle` — orchestrator states and per-cycle outcome reports.

pub mod cycle;
pub mod snapshot;
