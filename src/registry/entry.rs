//! Producer and consumer entries
//!
//! Each entry wraps the engine object together with the bookkeeping the
//! session needs. Closing is a one-way state transition so that an explicit
//! close racing with a transport-close callback closes the object once.

use crate::media::{Consumer, MediaKind, Producer, TrackHandle};
use crate::session::PeerId;

/// Lifecycle of a producer or consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
    /// Usable
    Open,
    /// Close requested, server round-trip pending
    Closing,
    /// Engine object closed
    Closed,
}

/// Entry for a local producer
pub struct ProducerEntry {
    producer: Box<dyn Producer>,

    /// Media kind (one producer per kind at most)
    pub kind: MediaKind,

    /// Whether the producer is paused (muted)
    pub paused: bool,

    /// Close state
    pub state: CloseState,
}

impl ProducerEntry {
    pub(super) fn new(producer: Box<dyn Producer>) -> Self {
        Self {
            kind: producer.kind(),
            producer,
            paused: false,
            state: CloseState::Open,
        }
    }

    pub fn id(&self) -> &str {
        self.producer.id()
    }

    pub fn is_open(&self) -> bool {
        self.state == CloseState::Open
    }

    /// Pause or resume; returns false if the producer is not open
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if !self.is_open() {
            return false;
        }

        if paused {
            self.producer.pause();
        } else {
            self.producer.resume();
        }
        self.paused = paused;
        true
    }

    /// Close the engine object unless already closed
    pub fn close(&mut self) {
        if self.state != CloseState::Closed {
            self.producer.close();
            self.state = CloseState::Closed;
        }
    }

    /// Record that the engine closed the object on its own
    pub fn mark_closed(&mut self) {
        self.state = CloseState::Closed;
    }
}

impl std::fmt::Debug for ProducerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerEntry")
            .field("id", &self.id())
            .field("kind", &self.kind)
            .field("paused", &self.paused)
            .field("state", &self.state)
            .finish()
    }
}

/// Entry for a remote consumer
pub struct ConsumerEntry {
    consumer: Box<dyn Consumer>,

    /// Peer the consumed producer belongs to
    pub peer_id: PeerId,

    /// Media kind
    pub kind: MediaKind,

    /// Remote producer id
    pub producer_id: String,

    /// Consumers start paused until the server is asked to resume them
    pub paused: bool,

    /// Close state
    pub state: CloseState,
}

impl ConsumerEntry {
    pub(super) fn new(peer_id: PeerId, consumer: Box<dyn Consumer>) -> Self {
        Self {
            kind: consumer.kind(),
            producer_id: consumer.producer_id().to_owned(),
            consumer,
            peer_id,
            paused: true,
            state: CloseState::Open,
        }
    }

    pub fn id(&self) -> &str {
        self.consumer.id()
    }

    pub fn track(&self) -> TrackHandle {
        self.consumer.track()
    }

    pub fn is_open(&self) -> bool {
        self.state == CloseState::Open
    }

    /// Resume local playout; returns false if the consumer is not open
    pub fn resume(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }

        self.consumer.resume();
        self.paused = false;
        true
    }

    /// Close the engine object unless already closed
    pub fn close(&mut self) {
        if self.state != CloseState::Closed {
            self.consumer.close();
            self.state = CloseState::Closed;
        }
    }

    /// Record that the engine closed the object on its own
    pub fn mark_closed(&mut self) {
        self.state = CloseState::Closed;
    }
}

impl std::fmt::Debug for ConsumerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerEntry")
            .field("id", &self.id())
            .field("peer_id", &self.peer_id)
            .field("kind", &self.kind)
            .field("producer_id", &self.producer_id)
            .field("paused", &self.paused)
            .field("state", &self.state)
            .finish()
    }
}

/// Registry counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered producers
    pub producers: usize,
    /// Number of registered consumers
    pub consumers: usize,
    /// Peer the video consumer is bound to
    pub video_peer: Option<PeerId>,
    /// Peer the audio consumer is bound to
    pub audio_peer: Option<PeerId>,
}
