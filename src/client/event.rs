//! Events posted from the worker to the host

use crate::media::{CameraFacing, MediaKind, TrackHandle};
use crate::session::{PeerId, SessionState};

/// Events from the room session
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Session state changed
    StateChanged(SessionState),

    /// Local camera track is ready for a preview renderer
    LocalTrack(TrackHandle),

    /// A remote track can be attached to a renderer
    RemoteTrackAttached {
        peer_id: PeerId,
        consumer_id: String,
        track: TrackHandle,
    },

    /// A remote track went away; detach its renderer
    RemoteTrackDetached {
        peer_id: PeerId,
        consumer_id: String,
        kind: MediaKind,
    },

    /// The peer being consumed changed
    ActivePeerChanged(Option<PeerId>),

    /// Capture switched to the other camera
    CameraSwitched(CameraFacing),

    /// Join retries were exhausted; the session stays idle
    JoinFailed { attempts: usize },
}
