//! Typed signaling responses
//!
//! Requests are built with `json!` at the call site; responses are decoded
//! into these structs so a missing or mistyped field surfaces as
//! `SignalingError::Malformed` instead of a default value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::media::MediaKind;

/// Direction of a transport being created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportDirection {
    Send,
    Recv,
}

/// `join-as-new-peer` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub router_rtp_capabilities: Value,
}

/// Server-issued connection parameters for one transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    pub id: String,
    pub ice_parameters: Value,
    pub ice_candidates: Value,
    pub dtls_parameters: Value,
}

/// `create-transport` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransportResponse {
    pub transport_options: TransportOptions,
}

/// `send-track` response
#[derive(Debug, Clone, Deserialize)]
pub struct SendTrackResponse {
    pub id: String,
}

/// `recv-track` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecvTrackResponse {
    pub id: String,
    pub producer_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: Value,
    #[serde(default)]
    pub producer_paused: bool,
}

/// One peer in a `sync` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerState {
    /// Media tag → server-side info about that stream
    #[serde(default)]
    pub media: IndexMap<String, Value>,
}

/// `sync` response, in the order the server listed the peers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResponse {
    pub peers: IndexMap<String, PeerState>,
}
