//! Signaling endpoints

use std::fmt;

/// Server method a signaling request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    JoinAsNewPeer,
    CreateTransport,
    ConnectTransport,
    SendTrack,
    RecvTrack,
    PauseProducer,
    ResumeProducer,
    ResumeConsumer,
    CloseConsumer,
    Leave,
    Sync,
}

impl Endpoint {
    /// Path segment appended to the signaling base URL
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::JoinAsNewPeer => "join-as-new-peer",
            Endpoint::CreateTransport => "create-transport",
            Endpoint::ConnectTransport => "connect-transport",
            Endpoint::SendTrack => "send-track",
            Endpoint::RecvTrack => "recv-track",
            Endpoint::PauseProducer => "pause-producer",
            Endpoint::ResumeProducer => "resume-producer",
            Endpoint::ResumeConsumer => "resume-consumer",
            Endpoint::CloseConsumer => "close-consumer",
            Endpoint::Leave => "leave",
            Endpoint::Sync => "sync",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
