//! Capability negotiator
//!
//! Wraps the engine device: loads the router capabilities once per session,
//! answers produce/consume questions and creates transports.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, MediaError, Result};
use crate::media::{
    MediaDevice, MediaEngine, MediaKind, RecvTransport, SendTransport, TransportListener,
};
use crate::signaling::TransportOptions;

/// Device capability holder for one session
pub struct CapabilityNegotiator {
    engine: Arc<dyn MediaEngine>,
    device: Box<dyn MediaDevice>,
}

impl CapabilityNegotiator {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        let device = engine.create_device();
        Self { engine, device }
    }

    /// Load the router's RTP capabilities
    ///
    /// Loading twice in one session is skipped.
    pub fn load(&mut self, router_rtp_capabilities: &Value) -> Result<()> {
        if self.device.is_loaded() {
            tracing::debug!("Device already loaded, skipping");
            return Ok(());
        }

        self.device.load(router_rtp_capabilities)?;
        tracing::info!(
            audio = self.device.can_produce(MediaKind::Audio),
            video = self.device.can_produce(MediaKind::Video),
            "Device loaded"
        );
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.device.is_loaded()
    }

    /// False when the device is not loaded
    pub fn can_produce(&self, kind: MediaKind) -> bool {
        self.device.is_loaded() && self.device.can_produce(kind)
    }

    /// False when the device is not loaded
    pub fn can_consume(&self, kind: MediaKind) -> bool {
        self.device.is_loaded() && self.device.can_consume(kind)
    }

    pub fn ensure_can_produce(&self, kind: MediaKind) -> Result<()> {
        self.ensure_loaded()?;
        if !self.device.can_produce(kind) {
            return Err(Error::Capability {
                kind,
                direction: "produce",
            });
        }
        Ok(())
    }

    pub fn ensure_can_consume(&self, kind: MediaKind) -> Result<()> {
        self.ensure_loaded()?;
        if !self.device.can_consume(kind) {
            return Err(Error::Capability {
                kind,
                direction: "consume",
            });
        }
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<()> {
        if !self.device.is_loaded() {
            return Err(MediaError::NotLoaded.into());
        }
        Ok(())
    }

    /// This endpoint's RTP capabilities
    pub fn rtp_capabilities(&self) -> Result<Value> {
        self.ensure_loaded()?;
        Ok(self.device.rtp_capabilities()?)
    }

    pub fn create_send_transport(
        &mut self,
        options: &TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn SendTransport>> {
        self.ensure_loaded()?;
        Ok(self.device.create_send_transport(options, listener)?)
    }

    pub fn create_recv_transport(
        &mut self,
        options: &TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn RecvTransport>> {
        self.ensure_loaded()?;
        Ok(self.device.create_recv_transport(options, listener)?)
    }

    /// Dispose the current device and start over with a fresh one
    pub fn renew(&mut self) {
        self.device.dispose();
        self.device = self.engine.create_device();
    }

    pub fn dispose(&mut self) {
        self.device.dispose();
    }
}

impl std::fmt::Debug for CapabilityNegotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityNegotiator")
            .field("loaded", &self.device.is_loaded())
            .finish()
    }
}
