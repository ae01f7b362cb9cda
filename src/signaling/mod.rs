//! Signaling with the selective-forwarding server
//!
//! The session talks to the server through three operations:
//!
//! - `request`: blocking request/response (join, transports, tracks)
//! - `request_async`: fire-and-forget (leave)
//! - `subscribe`/`unsubscribe`: push channel delivering roster updates
//!
//! ```text
//!  RoomWorker ── Signaler ──► Arc<dyn SignalingPort> ──► HttpSignaling ──► POST /signaling/<endpoint>
//!       ▲    (adds peerId,                                     │
//!       │     decodes replies)                                 │ sync poller
//!       └──────────── NotificationHandler(RosterSnapshot) ◄────┘
//! ```
//!
//! Only one request is ever in flight from the worker, so replies need no
//! correlation.

pub mod config;
pub mod endpoint;
pub mod http;
pub mod message;
pub mod port;

pub use config::HttpSignalingConfig;
pub use endpoint::Endpoint;
pub use http::HttpSignaling;
pub use message::{
    CreateTransportResponse, JoinResponse, PeerState, RecvTrackResponse, SendTrackResponse,
    SyncResponse, TransportDirection, TransportOptions,
};
pub use port::{decode, NotificationHandler, SignalingPort, Signaler};
