//! Statistics for room sessions

use std::time::{Duration, Instant};

use crate::registry::RegistryStats;
use crate::session::{PeerId, SessionState};

/// Counters the worker bumps as it runs
#[derive(Debug, Clone, Default)]
pub struct SessionCounters {
    /// Join attempts, retries included
    pub join_attempts: u64,
    /// Join attempts that failed
    pub join_failures: u64,
    /// Roster diff passes run
    pub diff_passes: u64,
    /// Consumers created
    pub subscribes: u64,
    /// Consumers released by unsubscribe decisions
    pub unsubscribes: u64,
    /// Signaling requests that failed outside of join
    pub signaling_failures: u64,
    /// Invariant violations recovered by resynchronising
    pub resyncs: u64,
}

/// Point-in-time view of a room session
#[derive(Debug, Clone, Default)]
pub struct RoomStats {
    /// Session state when the snapshot was taken
    pub state: SessionState,
    /// Accumulated counters
    pub counters: SessionCounters,
    /// Live producer count
    pub producers: usize,
    /// Live consumer count
    pub consumers: usize,
    /// Peer selected for subscription
    pub active_peer: Option<PeerId>,
    /// Peer the video consumer is bound to
    pub video_peer: Option<PeerId>,
    /// Peer the audio consumer is bound to
    pub audio_peer: Option<PeerId>,
    /// Time since the session reached `Joined`
    pub joined_for: Option<Duration>,
}

impl RoomStats {
    /// Assemble a snapshot from worker-owned state
    pub fn new(
        state: SessionState,
        counters: &SessionCounters,
        registry: RegistryStats,
        active_peer: Option<&PeerId>,
        joined_at: Option<Instant>,
    ) -> Self {
        Self {
            state,
            counters: counters.clone(),
            producers: registry.producers,
            consumers: registry.consumers,
            active_peer: active_peer.cloned(),
            video_peer: registry.video_peer,
            audio_peer: registry.audio_peer,
            joined_for: joined_at.map(|at| at.elapsed()),
        }
    }

    /// Whether the consumed peer is the one selected
    pub fn is_consistent(&self) -> bool {
        [&self.video_peer, &self.audio_peer]
            .into_iter()
            .flatten()
            .all(|peer| Some(peer) == self.active_peer.as_ref())
    }
}
