//! Active-peer selection policies
//!
//! The diff engine visits peers in the order a policy returns and selects
//! the first one publishing anything. Swapping the policy changes which
//! peer wins when several start publishing in the same snapshot.

use std::fmt::Debug;

use crate::session::PeerId;

use super::snapshot::RosterSnapshot;

/// Order in which candidate peers are considered for selection
pub trait SelectionPolicy: Debug + Send + Sync {
    fn order<'a>(&self, snapshot: &'a RosterSnapshot) -> Vec<&'a PeerId>;
}

/// Peers in the order the server listed them
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrivalOrder;

impl SelectionPolicy for ArrivalOrder {
    fn order<'a>(&self, snapshot: &'a RosterSnapshot) -> Vec<&'a PeerId> {
        snapshot.peers().collect()
    }
}

/// Peers sorted by id; independent of payload order
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicographicOrder;

impl SelectionPolicy for LexicographicOrder {
    fn order<'a>(&self, snapshot: &'a RosterSnapshot) -> Vec<&'a PeerId> {
        let mut peers: Vec<&PeerId> = snapshot.peers().collect();
        peers.sort();
        peers
    }
}
