//! Media-engine capability contracts
//!
//! The engine owns capture, codecs and the RTP/DTLS/ICE stack. These traits
//! are the only surface the session layer touches. Objects handed out by the
//! engine are `Send + Sync` so the worker task can hold them across awaits.
//!
//! Transports call back into a [`TransportListener`] when they need the
//! server's cooperation (DTLS connect, producer registration) and when a
//! producer or consumer is closed underneath the session because its
//! transport went away.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{MediaError, SignalingError};
use crate::signaling::TransportOptions;

use super::kind::MediaKind;

/// Opaque reference to a media track, used by the host to attach renderers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackHandle {
    pub id: String,
    pub kind: MediaKind,
}

impl TrackHandle {
    pub fn new(id: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Which camera the capturer is using
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    Front,
    Back,
}

/// A producer or consumer closed by its transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosedResource {
    Producer(String),
    Consumer(String),
}

/// Server-issued parameters for binding a consumer
#[derive(Debug, Clone)]
pub struct ConsumeParams {
    pub id: String,
    pub producer_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: Value,
}

/// Callbacks a transport makes into the session layer
#[async_trait]
pub trait TransportListener: Send + Sync {
    /// DTLS parameters are ready; the server must be told before media flows
    async fn on_connect(&self, transport_id: &str, dtls_parameters: Value)
        -> Result<(), SignalingError>;

    /// A producer is being created; returns the id the server assigned it
    async fn on_produce(
        &self,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: Value,
        app_data: Value,
    ) -> Result<String, SignalingError>;

    fn on_connection_state_change(&self, transport_id: &str, state: &str);

    /// The transport closed a producer or consumer on its own
    fn on_transport_close(&self, resource: ClosedResource);
}

/// Local capture track (microphone or camera)
pub trait LocalTrack: Send + Sync {
    fn handle(&self) -> TrackHandle;
    fn set_enabled(&mut self, enabled: bool);
    fn dispose(&mut self);
}

/// Local capture devices
pub trait LocalMedia: Send + Sync {
    fn create_track(&mut self, kind: MediaKind) -> Result<Box<dyn LocalTrack>, MediaError>;

    /// Start generating camera frames
    fn start_capture(&mut self) -> Result<(), MediaError>;

    /// Stop generating camera frames; the video producer stays alive
    fn stop_capture(&mut self) -> Result<(), MediaError>;

    fn switch_camera(&mut self) -> Result<CameraFacing, MediaError>;

    fn dispose(&mut self);
}

/// Local outbound media unit
pub trait Producer: Send + Sync {
    fn id(&self) -> &str;
    fn kind(&self) -> MediaKind;
    fn pause(&mut self);
    fn resume(&mut self);
    fn close(&mut self);
}

/// Local handle to a remote inbound media unit
pub trait Consumer: Send + Sync {
    fn id(&self) -> &str;
    fn producer_id(&self) -> &str;
    fn kind(&self) -> MediaKind;
    fn track(&self) -> TrackHandle;
    fn pause(&mut self);
    fn resume(&mut self);
    fn close(&mut self);
}

/// Transport carrying every producer of this endpoint
#[async_trait]
pub trait SendTransport: Send + Sync {
    fn id(&self) -> &str;

    /// Start sending `track`; calls `on_connect` (first time) and `on_produce`
    async fn produce(&mut self, track: TrackHandle) -> Result<Box<dyn Producer>, MediaError>;

    fn close(&mut self);
    fn dispose(&mut self);
}

/// Transport carrying every consumer of this endpoint
#[async_trait]
pub trait RecvTransport: Send + Sync {
    fn id(&self) -> &str;

    /// Bind a consumer; calls `on_connect` the first time
    async fn consume(&mut self, params: ConsumeParams) -> Result<Box<dyn Consumer>, MediaError>;

    fn close(&mut self);
    fn dispose(&mut self);
}

/// Endpoint-level capability holder
pub trait MediaDevice: Send + Sync {
    fn load(&mut self, router_rtp_capabilities: &Value) -> Result<(), MediaError>;
    fn is_loaded(&self) -> bool;
    fn can_produce(&self, kind: MediaKind) -> bool;
    fn can_consume(&self, kind: MediaKind) -> bool;

    /// This endpoint's RTP capabilities, sent with every recv-track request
    fn rtp_capabilities(&self) -> Result<Value, MediaError>;

    fn create_send_transport(
        &mut self,
        options: &TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn SendTransport>, MediaError>;

    fn create_recv_transport(
        &mut self,
        options: &TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn RecvTransport>, MediaError>;

    fn dispose(&mut self);
}

/// Factory for per-session engine objects
pub trait MediaEngine: Send + Sync {
    fn create_device(&self) -> Box<dyn MediaDevice>;
    fn create_local_media(&self) -> Box<dyn LocalMedia>;
}
