//! Resource registry implementation
//!
//! Owns every producer and consumer of the session, keyed by id, plus the
//! per-kind peer bindings that enforce single-peer subscription.
//! Only the room worker touches the registry, so there is no locking here.

use std::collections::HashMap;

use crate::media::{Consumer, MediaKind, Producer};
use crate::roster::SubscriptionView;
use crate::session::PeerId;

use super::entry::{CloseState, ConsumerEntry, ProducerEntry, RegistryStats};
use super::error::RegistryError;

/// Producers and consumers of one session
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    /// Local producers by id
    producers: HashMap<String, ProducerEntry>,

    /// Remote consumers by id
    consumers: HashMap<String, ConsumerEntry>,

    /// Peer whose video is consumed, and the consumer id
    video_binding: Option<(PeerId, String)>,

    /// Peer whose audio is consumed, and the consumer id
    audio_binding: Option<(PeerId, String)>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn binding(&self, kind: MediaKind) -> Option<&(PeerId, String)> {
        match kind {
            MediaKind::Video => self.video_binding.as_ref(),
            MediaKind::Audio => self.audio_binding.as_ref(),
        }
    }

    fn binding_mut(&mut self, kind: MediaKind) -> &mut Option<(PeerId, String)> {
        match kind {
            MediaKind::Video => &mut self.video_binding,
            MediaKind::Audio => &mut self.audio_binding,
        }
    }

    // ---- producers ----

    /// Register a producer
    ///
    /// At most one open producer per kind. A rejected producer is closed
    /// before the error is returned.
    pub fn insert_producer(&mut self, mut producer: Box<dyn Producer>) -> Result<(), RegistryError> {
        let id = producer.id().to_owned();
        let kind = producer.kind();

        let error = if self.producers.contains_key(&id) {
            Some(RegistryError::DuplicateProducer(id.clone()))
        } else if self.producer_for_kind(kind).is_some() {
            Some(RegistryError::ProducerKindOccupied(kind))
        } else {
            None
        };

        if let Some(error) = error {
            producer.close();
            return Err(error);
        }

        tracing::debug!(producer_id = %id, kind = %kind, "Producer registered");
        self.producers.insert(id, ProducerEntry::new(producer));
        Ok(())
    }

    pub fn producer_mut(&mut self, id: &str) -> Option<&mut ProducerEntry> {
        self.producers.get_mut(id)
    }

    /// The open producer of `kind`, if any
    pub fn producer_for_kind(&self, kind: MediaKind) -> Option<&ProducerEntry> {
        self.producers
            .values()
            .find(|entry| entry.kind == kind && entry.is_open())
    }

    /// Remove a producer; removing an unknown id is a no-op
    pub fn remove_producer(&mut self, id: &str) -> Option<ProducerEntry> {
        let entry = self.producers.remove(id);
        if entry.is_some() {
            tracing::debug!(producer_id = %id, "Producer removed");
        }
        entry
    }

    pub fn drain_producers(&mut self) -> Vec<ProducerEntry> {
        self.producers.drain().map(|(_, entry)| entry).collect()
    }

    // ---- consumers ----

    /// Check that a `kind` consumer for `peer` may be added
    pub fn check_consumer_slot(&self, peer: &PeerId, kind: MediaKind) -> Result<(), RegistryError> {
        if let Some((bound, _)) = self.binding(kind) {
            return Err(RegistryError::ConsumerKindOccupied {
                kind,
                bound: bound.clone(),
            });
        }

        let other = match kind {
            MediaKind::Video => MediaKind::Audio,
            MediaKind::Audio => MediaKind::Video,
        };
        if let Some((bound, _)) = self.binding(other) {
            if bound != peer {
                return Err(RegistryError::PeerMismatch {
                    peer: peer.clone(),
                    bound: bound.clone(),
                });
            }
        }

        Ok(())
    }

    /// Register a consumer bound to `peer`
    ///
    /// A rejected consumer is closed before the error is returned.
    pub fn insert_consumer(
        &mut self,
        peer: PeerId,
        mut consumer: Box<dyn Consumer>,
    ) -> Result<(), RegistryError> {
        let id = consumer.id().to_owned();
        let kind = consumer.kind();

        let checked = if self.consumers.contains_key(&id) {
            Err(RegistryError::DuplicateConsumer(id.clone()))
        } else {
            self.check_consumer_slot(&peer, kind)
        };

        if let Err(error) = checked {
            consumer.close();
            return Err(error);
        }

        tracing::debug!(consumer_id = %id, peer = %peer, kind = %kind, "Consumer registered");
        *self.binding_mut(kind) = Some((peer.clone(), id.clone()));
        self.consumers.insert(id, ConsumerEntry::new(peer, consumer));
        Ok(())
    }

    pub fn consumer(&self, id: &str) -> Option<&ConsumerEntry> {
        self.consumers.get(id)
    }

    pub fn consumer_mut(&mut self, id: &str) -> Option<&mut ConsumerEntry> {
        self.consumers.get_mut(id)
    }

    /// Id of the `kind` consumer bound to `peer`
    pub fn consumer_id_for(&self, peer: &PeerId, kind: MediaKind) -> Option<&str> {
        self.binding(kind)
            .filter(|(bound, _)| bound == peer)
            .map(|(_, id)| id.as_str())
    }

    /// Move an open consumer to `Closing`; false if it is not open
    pub fn begin_close_consumer(&mut self, id: &str) -> bool {
        match self.consumers.get_mut(id) {
            Some(entry) if entry.is_open() => {
                entry.state = CloseState::Closing;
                true
            }
            _ => false,
        }
    }

    /// Remove a consumer and its peer binding; removing an unknown id is a no-op
    pub fn remove_consumer(&mut self, id: &str) -> Option<ConsumerEntry> {
        let entry = self.consumers.remove(id)?;

        let binding = self.binding_mut(entry.kind);
        if binding.as_ref().is_some_and(|(_, bound)| bound == id) {
            *binding = None;
        }

        tracing::debug!(consumer_id = %id, peer = %entry.peer_id, "Consumer removed");
        Some(entry)
    }

    pub fn drain_consumers(&mut self) -> Vec<ConsumerEntry> {
        self.video_binding = None;
        self.audio_binding = None;
        self.consumers.drain().map(|(_, entry)| entry).collect()
    }

    // ---- whole registry ----

    /// Verify the single-peer subscription rules against `active`
    ///
    /// At most one consumer per kind, both kinds bound to the same peer, and
    /// any bound peer is the active media peer.
    pub fn check_invariants(&self, active: Option<&PeerId>) -> Result<(), RegistryError> {
        for kind in MediaKind::ALL {
            let count = self.consumers.values().filter(|c| c.kind == kind).count();
            if count > 1 {
                return Err(RegistryError::InvariantViolation(format!(
                    "{} {} consumers",
                    count, kind
                )));
            }

            let Some((peer, id)) = self.binding(kind) else {
                if count == 1 {
                    return Err(RegistryError::InvariantViolation(format!(
                        "unbound {} consumer",
                        kind
                    )));
                }
                continue;
            };

            match self.consumers.get(id) {
                Some(entry) if entry.kind == kind && entry.peer_id == *peer => {}
                _ => {
                    return Err(RegistryError::InvariantViolation(format!(
                        "{} binding for {} points at consumer {}",
                        kind, peer, id
                    )));
                }
            }

            if active != Some(peer) {
                return Err(RegistryError::InvariantViolation(format!(
                    "{} consumed from {} which is not the active peer",
                    kind, peer
                )));
            }
        }

        if let (Some((video, _)), Some((audio, _))) = (&self.video_binding, &self.audio_binding) {
            if video != audio {
                return Err(RegistryError::InvariantViolation(format!(
                    "video from {} but audio from {}",
                    video, audio
                )));
            }
        }

        Ok(())
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty() && self.consumers.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            producers: self.producers.len(),
            consumers: self.consumers.len(),
            video_peer: self.video_binding.as_ref().map(|(peer, _)| peer.clone()),
            audio_peer: self.audio_binding.as_ref().map(|(peer, _)| peer.clone()),
        }
    }
}

impl SubscriptionView for ResourceRegistry {
    fn has_consumer(&self, peer: &PeerId, kind: MediaKind) -> bool {
        self.consumer_id_for(peer, kind).is_some()
    }
}
