//! Signaling contract consumed by the session
//!
//! Any transport (HTTP polling, a persistent message socket) plugs in by
//! implementing [`SignalingPort`]. The session owns one instance for its
//! whole lifetime; there is no process-wide transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::SignalingError;
use crate::roster::RosterSnapshot;
use crate::session::PeerId;

use super::endpoint::Endpoint;

/// Receives every roster update the transport observes
pub type NotificationHandler = Arc<dyn Fn(RosterSnapshot) + Send + Sync>;

/// Request/response, fire-and-forget and push channel to the server
#[async_trait]
pub trait SignalingPort: Send + Sync {
    /// Send `payload` and wait for the reply. A reply of `null` means the
    /// server sent nothing usable.
    async fn request(&self, endpoint: Endpoint, payload: Value) -> Result<Value, SignalingError>;

    /// Send `payload` without waiting; delivery is best-effort
    fn request_async(&self, endpoint: Endpoint, payload: Value);

    /// Start delivering roster updates for `peer_id` to `handler`. Updates
    /// arrive "eventually"; callers must not assume any cadence.
    fn subscribe(&self, peer_id: &PeerId, handler: NotificationHandler)
        -> Result<(), SignalingError>;

    /// Stop delivering roster updates. Safe to call when not subscribed.
    fn unsubscribe(&self);
}

/// Session-side front of a [`SignalingPort`]
///
/// Stamps the local `peerId` on every payload and decodes replies into
/// typed responses.
#[derive(Clone)]
pub struct Signaler {
    port: Arc<dyn SignalingPort>,
    peer_id: PeerId,
}

impl Signaler {
    pub fn new(port: Arc<dyn SignalingPort>, peer_id: PeerId) -> Self {
        Self { port, peer_id }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Request and decode the reply as `T`
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        payload: Value,
    ) -> Result<T, SignalingError> {
        let reply = self.port.request(endpoint, self.stamp(payload)).await?;
        decode(endpoint, reply)
    }

    /// Request an endpoint whose reply carries nothing we use
    pub async fn request_ack(&self, endpoint: Endpoint, payload: Value) -> Result<(), SignalingError> {
        self.port.request(endpoint, self.stamp(payload)).await?;
        Ok(())
    }

    /// Fire-and-forget
    pub fn notify(&self, endpoint: Endpoint, payload: Value) {
        self.port.request_async(endpoint, self.stamp(payload));
    }

    pub fn subscribe(&self, handler: NotificationHandler) -> Result<(), SignalingError> {
        self.port.subscribe(&self.peer_id, handler)
    }

    pub fn unsubscribe(&self) {
        self.port.unsubscribe();
    }

    fn stamp(&self, mut payload: Value) -> Value {
        match payload {
            Value::Object(ref mut map) => {
                map.insert("peerId".to_owned(), Value::String(self.peer_id.to_string()));
                payload
            }
            _ => json!({ "peerId": self.peer_id }),
        }
    }
}

impl std::fmt::Debug for Signaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signaler")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

/// Decode a reply, mapping `null` to `NoResponse`
pub fn decode<T: DeserializeOwned>(endpoint: Endpoint, reply: Value) -> Result<T, SignalingError> {
    if reply.is_null() {
        return Err(SignalingError::NoResponse(endpoint));
    }

    serde_json::from_value(reply).map_err(|e| SignalingError::Malformed {
        endpoint,
        reason: e.to_string(),
    })
}
