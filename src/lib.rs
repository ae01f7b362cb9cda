//! Client-side session controller for selective-forwarding media rooms
//!
//! Each participant publishes its own microphone and camera and subscribes to
//! exactly one other publishing participant at a time. The selective-forwarding
//! server is reached through a pluggable [`signaling::SignalingPort`]; the media
//! engine that captures, encodes and transports RTP is reached through the
//! capability contracts in [`media`].
//!
//! # Architecture
//!
//! ```text
//!        host / UI                          serialized worker task
//!  ┌──────────────────┐   Command    ┌────────────────────────────────────┐
//!  │ RoomClient       │ ───────────► │ RoomWorker                         │
//!  │  join/leave/mute │              │  SessionState machine              │
//!  │  camera/reset    │ ◄─────────── │  CapabilityNegotiator (device)     │
//!  └──────────────────┘  RoomEvent   │  ResourceRegistry (prod/cons)      │
//!            ▲                       │  RosterDiffer (active peer)        │
//!            │ watch<SessionState>   └───────┬───────────────▲────────────┘
//!            └───────────────────────────────┘   request     │ roster push
//!                                           ┌────▼───────────┴───┐
//!                                           │ SignalingPort      │
//!                                           │ (HTTP poll, ...)   │
//!                                           └────────────────────┘
//! ```
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use sfu_room_rs::client::{RoomClient, RoomConfig};
//! use sfu_room_rs::media::MediaEngine;
//! use sfu_room_rs::signaling::{HttpSignaling, HttpSignalingConfig};
//!
//! # async fn example(engine: Arc<dyn MediaEngine>) -> sfu_room_rs::Result<()> {
//! let signaling = Arc::new(HttpSignaling::new(HttpSignalingConfig::default())?);
//! let (room, mut events) = RoomClient::new(signaling, engine, RoomConfig::default());
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//! });
//!
//! room.join_room().await;
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod client;
pub mod error;
pub mod media;
pub mod registry;
pub mod roster;
pub mod session;
pub mod signaling;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{RoomClient, RoomConfig, RoomEvent};
pub use error::{Error, Result};
pub use session::{PeerId, SessionState};
