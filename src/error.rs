//! Error types
//!
//! `Error` is the crate-wide error. Its variants follow the failure taxonomy
//! the orchestrator acts on: signaling failures abandon the operation (or
//! retry a join), capability failures skip a producer or subscription,
//! resource-state failures are no-ops, invariant violations resynchronise.

use crate::media::MediaKind;
use crate::registry::RegistryError;
use crate::session::SessionState;
use crate::signaling::Endpoint;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("signaling failure: {0}")]
    Signaling(#[from] SignalingError),

    #[error("this endpoint cannot {direction} {kind}")]
    Capability {
        kind: MediaKind,
        direction: &'static str,
    },

    #[error("resource state: {0}")]
    ResourceState(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("media engine: {0}")]
    Media(#[from] MediaError),

    #[error("operation not valid in state {0}")]
    InvalidState(SessionState),

    #[error("join abandoned after {attempts} attempts")]
    JoinExhausted { attempts: usize },
}

/// Failure talking to the signaling server
#[derive(Debug, thiserror::Error)]
pub enum SignalingError {
    #[error("no response to {0}")]
    NoResponse(Endpoint),

    #[error("malformed {endpoint} response: {reason}")]
    Malformed { endpoint: Endpoint, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure reported by the media engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("device has not loaded router capabilities")]
    NotLoaded,

    #[error("device already loaded")]
    AlreadyLoaded,

    #[error("invalid router capabilities: {0}")]
    InvalidCapabilities(String),

    #[error("transport {0} is closed")]
    TransportClosed(String),

    #[error("{0}")]
    Engine(String),
}
