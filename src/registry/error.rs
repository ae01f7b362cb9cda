//! Registry error types
//!
//! Error types for resource registry operations.

use crate::media::MediaKind;
use crate::session::PeerId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A producer with this id is already registered
    DuplicateProducer(String),
    /// An open producer of this kind already exists
    ProducerKindOccupied(MediaKind),
    /// A consumer with this id is already registered
    DuplicateConsumer(String),
    /// A consumer of this kind already exists
    ConsumerKindOccupied { kind: MediaKind, bound: PeerId },
    /// The other kind is consumed from a different peer
    PeerMismatch { peer: PeerId, bound: PeerId },
    /// Registry contents contradict the single-peer subscription rules
    InvariantViolation(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateProducer(id) => write!(f, "Producer already registered: {}", id),
            RegistryError::ProducerKindOccupied(kind) => {
                write!(f, "An open {} producer already exists", kind)
            }
            RegistryError::DuplicateConsumer(id) => write!(f, "Consumer already registered: {}", id),
            RegistryError::ConsumerKindOccupied { kind, bound } => {
                write!(f, "A {} consumer already exists for peer {}", kind, bound)
            }
            RegistryError::PeerMismatch { peer, bound } => {
                write!(f, "Cannot consume from {} while consuming from {}", peer, bound)
            }
            RegistryError::InvariantViolation(reason) => write!(f, "Invariant violation: {}", reason),
        }
    }
}

impl std::error::Error for RegistryError {}
