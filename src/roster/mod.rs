//! Roster tracking and subscription decisions
//!
//! Each roster update from the signaling push channel is diffed against the
//! previous one to decide what to consume:
//!
//! ```text
//!   snapshot N ──► RosterDiffer::apply ──► [Subscribe | Unsubscribe | PeerLeft]
//!                   │ previous = N-1                    │
//!                   │ active peer                       ▼
//!                   └──────── SubscriptionView ◄── ResourceRegistry
//! ```
//!
//! At most one remote peer (the active media peer) is consumed at a time.
//! Which peer wins when several publish is decided by a [`SelectionPolicy`].

pub mod diff;
pub mod policy;
pub mod snapshot;

pub use diff::{RosterDiffer, RosterEffect, SubscriptionView};
pub use policy::{ArrivalOrder, LexicographicOrder, SelectionPolicy};
pub use snapshot::RosterSnapshot;
