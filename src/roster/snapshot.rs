//! Point-in-time view of who is in the room and what they publish

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::media::MediaTag;
use crate::session::PeerId;
use crate::signaling::SyncResponse;

/// Peer id → media tags that peer is publishing
///
/// Peers keep the order the server listed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    peers: IndexMap<PeerId, BTreeSet<String>>,
}

impl RosterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_peer<I, T>(mut self, peer: impl Into<PeerId>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.insert(peer, tags);
        self
    }

    /// Add or replace a peer's published tags
    pub fn insert<I, T>(&mut self, peer: impl Into<PeerId>, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.peers
            .insert(peer.into(), tags.into_iter().map(Into::into).collect());
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.peers.contains_key(peer)
    }

    /// Whether `peer` is present and publishing under `tag`
    pub fn publishes(&self, peer: &PeerId, tag: MediaTag) -> bool {
        self.peers
            .get(peer)
            .map(|tags| tags.contains(tag.as_str()))
            .unwrap_or(false)
    }

    /// Peers in server order
    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.peers.keys()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl From<SyncResponse> for RosterSnapshot {
    /// A tag counts as published only when the server attached an info
    /// object to it.
    fn from(sync: SyncResponse) -> Self {
        let peers = sync
            .peers
            .into_iter()
            .map(|(id, state)| {
                let tags = state
                    .media
                    .into_iter()
                    .filter(|(_, info)| info.is_object())
                    .map(|(tag, _)| tag)
                    .collect();
                (PeerId::from(id), tags)
            })
            .collect();

        Self { peers }
    }
}
