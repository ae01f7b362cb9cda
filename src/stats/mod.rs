//! Statistics and metrics for room sessions
//!
//! The worker owns the counters; the host gets copies through
//! [`RoomClient::stats`](crate::client::RoomClient::stats).

pub mod metrics;

pub use metrics::{RoomStats, SessionCounters};
