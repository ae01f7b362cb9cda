//! Transport callbacks routed through signaling and back into the worker

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::error::SignalingError;
use crate::media::{ClosedResource, MediaKind, TransportListener};
use crate::signaling::{Endpoint, SendTrackResponse, Signaler};

use super::command::Command;

/// Listener handed to every transport the session creates
///
/// Connect and produce callbacks run while the worker awaits the transport
/// call that triggered them, so their signaling requests stay serialized.
pub(crate) struct SignalingTransportListener {
    signaler: Signaler,
    commands: mpsc::WeakSender<Command>,
}

impl SignalingTransportListener {
    pub fn new(signaler: Signaler, commands: mpsc::WeakSender<Command>) -> Self {
        Self { signaler, commands }
    }
}

#[async_trait]
impl TransportListener for SignalingTransportListener {
    async fn on_connect(
        &self,
        transport_id: &str,
        dtls_parameters: Value,
    ) -> Result<(), SignalingError> {
        self.signaler
            .request_ack(
                Endpoint::ConnectTransport,
                json!({
                    "transportId": transport_id,
                    "dtlsParameters": dtls_parameters,
                }),
            )
            .await?;

        tracing::debug!(transport_id = %transport_id, "Transport connected");
        Ok(())
    }

    async fn on_produce(
        &self,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: Value,
        app_data: Value,
    ) -> Result<String, SignalingError> {
        let app_data = if app_data.get("mediaTag").is_some() {
            app_data
        } else {
            json!({ "mediaTag": kind.camera_tag() })
        };

        let response: SendTrackResponse = self
            .signaler
            .request(
                Endpoint::SendTrack,
                json!({
                    "transportId": transport_id,
                    "kind": kind,
                    "rtpParameters": rtp_parameters,
                    "paused": false,
                    "appData": app_data,
                }),
            )
            .await?;

        Ok(response.id)
    }

    fn on_connection_state_change(&self, transport_id: &str, state: &str) {
        tracing::debug!(transport_id = %transport_id, state = %state, "Transport connection state");
    }

    fn on_transport_close(&self, resource: ClosedResource) {
        let Some(commands) = self.commands.upgrade() else {
            return;
        };

        if let Err(e) = commands.try_send(Command::ResourceClosed(resource)) {
            tracing::warn!(error = %e, "Dropped transport close notification");
        }
    }
}
