//! Resource registry for producers and consumers
//!
//! The registry is the single owner of every engine object the session
//! creates after join. It enforces the subscription rules:
//!
//! - at most one consumer per media kind
//! - when both kinds are consumed, both belong to the same peer
//!
//! ```text
//!                       ResourceRegistry
//!               ┌──────────────────────────────┐
//!               │ producers: id -> Entry       │
//!               │ consumers: id -> Entry       │
//!               │ video: (peer, consumer id)   │
//!               │ audio: (peer, consumer id)   │
//!               └──────────────┬───────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    enable mic/cam      roster effects      transport close
//!    insert_producer     insert/remove       remove_* (idempotent)
//! ```
//!
//! Removal is idempotent so an explicit close and a transport-close
//! callback for the same object both succeed.

pub mod entry;
pub mod error;
pub mod store;

pub use entry::{CloseState, ConsumerEntry, ProducerEntry, RegistryStats};
pub use error::RegistryError;
pub use store::ResourceRegistry;
