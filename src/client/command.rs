//! Commands processed by the room worker

use tokio::sync::oneshot;

use crate::media::ClosedResource;
use crate::roster::RosterSnapshot;
use crate::stats::RoomStats;

/// Work item for the serialized worker
#[derive(Debug)]
pub(crate) enum Command {
    /// Host join; starts a fresh retry budget
    Join,
    /// Scheduled retry; stale if the generation moved on
    RetryJoin { generation: u64 },
    Leave,
    EnableMic,
    EnableCam,
    MuteMic,
    UnmuteMic,
    StartCamera,
    StopCamera,
    SwitchCamera,
    /// Roster update from the push channel
    Roster(RosterSnapshot),
    /// A transport closed a producer or consumer on its own
    ResourceClosed(ClosedResource),
    Stats(oneshot::Sender<RoomStats>),
    /// Stop the worker (reset)
    Shutdown,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Join => "join",
            Command::RetryJoin { .. } => "retry-join",
            Command::Leave => "leave",
            Command::EnableMic => "enable-mic",
            Command::EnableCam => "enable-cam",
            Command::MuteMic => "mute-mic",
            Command::UnmuteMic => "unmute-mic",
            Command::StartCamera => "start-camera",
            Command::StopCamera => "stop-camera",
            Command::SwitchCamera => "switch-camera",
            Command::Roster(_) => "roster",
            Command::ResourceClosed(_) => "resource-closed",
            Command::Stats(_) => "stats",
            Command::Shutdown => "shutdown",
        }
    }
}
