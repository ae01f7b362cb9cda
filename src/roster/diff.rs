//! Roster diff engine
//!
//! Turns successive roster snapshots into subscribe/unsubscribe decisions
//! for the single active media peer. The engine is pure: it reads current
//! subscriptions through [`SubscriptionView`] and returns effects for the
//! caller to carry out.

use std::sync::Arc;

use crate::media::{MediaKind, MediaTag};
use crate::session::PeerId;

use super::policy::SelectionPolicy;
use super::snapshot::RosterSnapshot;

/// Decision produced by a diff pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEffect {
    /// Start consuming `tag` from `peer`
    Subscribe { peer: PeerId, tag: MediaTag },
    /// Close the `kind` consumer bound to `peer`
    Unsubscribe { peer: PeerId, kind: MediaKind },
    /// `peer` was in the previous snapshot and is gone now
    PeerLeft { peer: PeerId },
}

/// Read access to which consumers currently exist
pub trait SubscriptionView {
    fn has_consumer(&self, peer: &PeerId, kind: MediaKind) -> bool;
}

/// Stateful diff engine: previous snapshot plus the active media peer
#[derive(Debug)]
pub struct RosterDiffer {
    self_id: PeerId,
    policy: Arc<dyn SelectionPolicy>,
    previous: Option<RosterSnapshot>,
    active_peer: Option<PeerId>,
}

impl RosterDiffer {
    pub fn new(self_id: PeerId, policy: Arc<dyn SelectionPolicy>) -> Self {
        Self {
            self_id,
            policy,
            previous: None,
            active_peer: None,
        }
    }

    pub fn active_peer(&self) -> Option<&PeerId> {
        self.active_peer.as_ref()
    }

    /// Forget the previous snapshot and the active peer
    pub fn reset(&mut self) {
        self.previous = None;
        self.active_peer = None;
    }

    /// Run one diff pass and replace the stored snapshot with `snapshot`
    pub fn apply(
        &mut self,
        snapshot: RosterSnapshot,
        view: &dyn SubscriptionView,
    ) -> Vec<RosterEffect> {
        let mut effects = Vec::new();
        let mut active_went_quiet = false;

        for peer in self.policy.order(&snapshot) {
            if *peer == self.self_id {
                continue;
            }

            if self.previous.as_ref().is_some_and(|prev| !prev.contains(peer)) {
                tracing::debug!(peer = %peer, "Peer joined the room");
            }

            let sending_video = snapshot.publishes(peer, MediaTag::CamVideo);
            let sending_audio = snapshot.publishes(peer, MediaTag::CamAudio);

            match &self.active_peer {
                None if sending_video || sending_audio => {
                    tracing::info!(peer = %peer, "Selected active media peer");
                    self.active_peer = Some(peer.clone());
                }
                None => continue,
                Some(active) if active != peer => continue,
                Some(_) => {}
            }

            for (tag, sending) in [
                (MediaTag::CamVideo, sending_video),
                (MediaTag::CamAudio, sending_audio),
            ] {
                let subscribed = view.has_consumer(peer, tag.kind());

                if sending && !subscribed {
                    effects.push(RosterEffect::Subscribe {
                        peer: peer.clone(),
                        tag,
                    });
                } else if !sending && subscribed {
                    tracing::debug!(peer = %peer, kind = %tag.kind(), "Peer stopped publishing");
                    effects.push(RosterEffect::Unsubscribe {
                        peer: peer.clone(),
                        kind: tag.kind(),
                    });
                }
            }

            if !sending_video && !sending_audio {
                active_went_quiet = true;
            }
        }

        if let Some(previous) = &self.previous {
            for peer in previous.peers() {
                if *peer == self.self_id || snapshot.contains(peer) {
                    continue;
                }

                tracing::info!(peer = %peer, "Peer left the room");

                for kind in [MediaKind::Video, MediaKind::Audio] {
                    if view.has_consumer(peer, kind) {
                        effects.push(RosterEffect::Unsubscribe {
                            peer: peer.clone(),
                            kind,
                        });
                    }
                }
                effects.push(RosterEffect::PeerLeft { peer: peer.clone() });

                if self.active_peer.as_ref() == Some(peer) {
                    self.active_peer = None;
                }
            }
        }

        if active_went_quiet {
            if let Some(peer) = self.active_peer.take() {
                tracing::info!(peer = %peer, "Active media peer stopped publishing");
            }
        }

        self.previous = Some(snapshot);
        effects
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::roster::{ArrivalOrder, LexicographicOrder};

    /// Subscriptions that follow every effect, as a worker with an
    /// always-succeeding server would
    #[derive(Default)]
    struct Subscriptions {
        consumers: HashMap<MediaKind, PeerId>,
        log: Vec<RosterEffect>,
    }

    impl SubscriptionView for Subscriptions {
        fn has_consumer(&self, peer: &PeerId, kind: MediaKind) -> bool {
            self.consumers.get(&kind) == Some(peer)
        }
    }

    impl Subscriptions {
        fn apply(&mut self, effects: Vec<RosterEffect>) {
            for effect in effects {
                match &effect {
                    RosterEffect::Subscribe { peer, tag } => {
                        let previous = self.consumers.insert(tag.kind(), peer.clone());
                        assert!(previous.is_none(), "second {} consumer", tag.kind());
                    }
                    RosterEffect::Unsubscribe { peer, kind } => {
                        assert_eq!(self.consumers.remove(kind).as_ref(), Some(peer));
                    }
                    RosterEffect::PeerLeft { .. } => {}
                }
                self.log.push(effect);
            }
        }

        fn assert_invariants(&self, active: Option<&PeerId>) {
            if let (Some(video), Some(audio)) = (
                self.consumers.get(&MediaKind::Video),
                self.consumers.get(&MediaKind::Audio),
            ) {
                assert_eq!(video, audio);
                assert_eq!(Some(video), active);
            }
            for peer in self.consumers.values() {
                assert_eq!(Some(peer), active);
            }
        }
    }

    fn differ() -> RosterDiffer {
        RosterDiffer::new(PeerId::from("me"), Arc::new(LexicographicOrder))
    }

    fn peer(id: &str) -> PeerId {
        PeerId::from(id)
    }

    fn subscribe(id: &str, tag: MediaTag) -> RosterEffect {
        RosterEffect::Subscribe { peer: peer(id), tag }
    }

    fn unsubscribe(id: &str, kind: MediaKind) -> RosterEffect {
        RosterEffect::Unsubscribe {
            peer: peer(id),
            kind,
        }
    }

    #[test]
    fn test_video_then_audio_then_departure() {
        let mut differ = differ();
        let mut subs = Subscriptions::default();

        let effects = differ.apply(
            RosterSnapshot::new().with_peer("peerA", ["cam-video"]),
            &subs,
        );
        assert_eq!(effects, vec![subscribe("peerA", MediaTag::CamVideo)]);
        subs.apply(effects);

        let effects = differ.apply(
            RosterSnapshot::new().with_peer("peerA", ["cam-video", "cam-audio"]),
            &subs,
        );
        assert_eq!(effects, vec![subscribe("peerA", MediaTag::CamAudio)]);
        subs.apply(effects);

        let effects = differ.apply(RosterSnapshot::new(), &subs);
        assert_eq!(
            effects,
            vec![
                unsubscribe("peerA", MediaKind::Video),
                unsubscribe("peerA", MediaKind::Audio),
                RosterEffect::PeerLeft {
                    peer: peer("peerA")
                },
            ]
        );
        subs.apply(effects);

        assert!(differ.active_peer().is_none());
        assert!(subs.consumers.is_empty());
    }

    #[test]
    fn test_video_round_trip() {
        let mut differ = differ();
        let mut subs = Subscriptions::default();

        let effects = differ.apply(RosterSnapshot::new().with_peer("a", ["cam-video"]), &subs);
        subs.apply(effects);
        let effects = differ.apply(
            RosterSnapshot::new().with_peer("a", Vec::<String>::new()),
            &subs,
        );
        subs.apply(effects);

        assert_eq!(
            subs.log,
            vec![
                subscribe("a", MediaTag::CamVideo),
                unsubscribe("a", MediaKind::Video)
            ]
        );
        assert!(!subs.has_consumer(&peer("a"), MediaKind::Video));
    }

    #[test]
    fn test_self_is_never_selected() {
        let mut differ = differ();
        let subs = Subscriptions::default();

        let effects = differ.apply(
            RosterSnapshot::new().with_peer("me", ["cam-video", "cam-audio"]),
            &subs,
        );

        assert!(effects.is_empty());
        assert!(differ.active_peer().is_none());

        // Self disappearing is not a departure either
        let effects = differ.apply(RosterSnapshot::new(), &subs);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_simultaneous_publishers_pick_one() {
        let mut differ = differ();
        let mut subs = Subscriptions::default();

        let effects = differ.apply(
            RosterSnapshot::new()
                .with_peer("zoe", ["cam-video", "cam-audio"])
                .with_peer("adam", ["cam-video", "cam-audio"]),
            &subs,
        );
        subs.apply(effects);

        assert_eq!(differ.active_peer(), Some(&peer("adam")));
        assert!(subs.log.iter().all(|e| matches!(
            e,
            RosterEffect::Subscribe { peer, .. } if peer.as_str() == "adam"
        )));

        // zoe stays ignored while adam is present
        let effects = differ.apply(
            RosterSnapshot::new()
                .with_peer("zoe", ["cam-video", "cam-audio"])
                .with_peer("adam", ["cam-video", "cam-audio"]),
            &subs,
        );
        assert!(effects.is_empty());

        // adam leaves; zoe is picked up on the following pass
        let effects = differ.apply(
            RosterSnapshot::new().with_peer("zoe", ["cam-video", "cam-audio"]),
            &subs,
        );
        subs.apply(effects);
        assert!(differ.active_peer().is_none());

        let effects = differ.apply(
            RosterSnapshot::new().with_peer("zoe", ["cam-video", "cam-audio"]),
            &subs,
        );
        assert_eq!(
            effects,
            vec![
                subscribe("zoe", MediaTag::CamVideo),
                subscribe("zoe", MediaTag::CamAudio)
            ]
        );
        assert_eq!(differ.active_peer(), Some(&peer("zoe")));
    }

    #[test]
    fn test_arrival_order_policy_picks_first_listed() {
        let mut differ = RosterDiffer::new(PeerId::from("me"), Arc::new(ArrivalOrder));
        let subs = Subscriptions::default();

        differ.apply(
            RosterSnapshot::new()
                .with_peer("zoe", ["cam-audio"])
                .with_peer("adam", ["cam-video"]),
            &subs,
        );

        assert_eq!(differ.active_peer(), Some(&peer("zoe")));
    }

    #[test]
    fn test_quiet_active_peer_is_released() {
        let mut differ = differ();
        let mut subs = Subscriptions::default();

        let effects = differ.apply(
            RosterSnapshot::new()
                .with_peer("a", ["cam-audio"])
                .with_peer("b", ["cam-video"]),
            &subs,
        );
        subs.apply(effects);
        assert_eq!(differ.active_peer(), Some(&peer("a")));

        let effects = differ.apply(
            RosterSnapshot::new()
                .with_peer("a", Vec::<String>::new())
                .with_peer("b", ["cam-video"]),
            &subs,
        );
        assert_eq!(effects, vec![unsubscribe("a", MediaKind::Audio)]);
        subs.apply(effects);
        assert!(differ.active_peer().is_none());

        let effects = differ.apply(
            RosterSnapshot::new()
                .with_peer("a", Vec::<String>::new())
                .with_peer("b", ["cam-video"]),
            &subs,
        );
        assert_eq!(effects, vec![subscribe("b", MediaTag::CamVideo)]);
    }

    #[test]
    fn test_departure_of_inactive_peer_keeps_active() {
        let mut differ = differ();
        let mut subs = Subscriptions::default();

        let effects = differ.apply(
            RosterSnapshot::new()
                .with_peer("a", ["cam-video"])
                .with_peer("b", ["cam-video"]),
            &subs,
        );
        subs.apply(effects);

        let effects = differ.apply(RosterSnapshot::new().with_peer("a", ["cam-video"]), &subs);
        assert_eq!(effects, vec![RosterEffect::PeerLeft { peer: peer("b") }]);
        assert_eq!(differ.active_peer(), Some(&peer("a")));
    }

    #[test]
    fn test_invariants_hold_for_arbitrary_snapshot_sequences() {
        const PEERS: [&str; 4] = ["me", "a", "b", "c"];
        const TAGS: [&str; 3] = ["cam-video", "cam-audio", "screen-video"];

        // xorshift64; fixed seed keeps the sequence reproducible
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for policy in [
            Arc::new(LexicographicOrder) as Arc<dyn SelectionPolicy>,
            Arc::new(ArrivalOrder) as Arc<dyn SelectionPolicy>,
        ] {
            let mut differ = RosterDiffer::new(PeerId::from("me"), policy);
            let mut subs = Subscriptions::default();

            for _ in 0..2_000 {
                let mut snapshot = RosterSnapshot::new();
                for id in PEERS {
                    if next() % 3 == 0 {
                        continue;
                    }
                    let tags: Vec<&str> = TAGS.into_iter().filter(|_| next() % 2 == 0).collect();
                    snapshot.insert(id, tags);
                }

                let effects = differ.apply(snapshot, &subs);
                subs.apply(effects);
                subs.assert_invariants(differ.active_peer());
            }
        }
    }
}
