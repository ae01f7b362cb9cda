//! Room session client
//!
//! [`RoomClient`] is the handle the host keeps. Each operation becomes a
//! command for a single worker task that owns the device, transports,
//! producers, consumers and roster history:
//!
//! ```text
//! join ──► join-as-new-peer ──► load device ──► create send/recv transports ──► Joined
//!               │ failure                                                         │
//!               └──► release partial resources ──► Idle ──► backoff ──► retry     ▼
//!                                                               roster push ──► diff pass
//! ```

pub(crate) mod command;
pub mod config;
pub mod event;
pub(crate) mod listener;
pub(crate) mod retry;
pub mod room;
pub(crate) mod worker;

pub use config::{JoinRetryConfig, RoomConfig};
pub use event::RoomEvent;
pub use room::RoomClient;
