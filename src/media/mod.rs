//! Media kinds and media-engine contracts
//!
//! This module provides:
//! - `MediaKind` / `MediaTag` shared by signaling, registry and roster code
//! - The capability contracts an engine implements: device, send/recv
//!   transports, producers, consumers, local capture
//!
//! Capture, encode/decode and RTP transport live behind these traits. The
//! session layer only creates, pauses, resumes and closes the objects they
//! hand out.

pub mod engine;
pub mod kind;

pub use engine::{
    CameraFacing, ClosedResource, ConsumeParams, Consumer, LocalMedia, LocalTrack, MediaDevice,
    MediaEngine, Producer, RecvTransport, SendTransport, TrackHandle, TransportListener,
};
pub use kind::{MediaKind, MediaTag};
