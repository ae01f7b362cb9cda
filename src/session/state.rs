//! Session state machine
//!
//! Tracks the room session from construction to departure.

use std::fmt;

/// Session lifecycle state
///
/// ```text
/// Idle ──► Joining ──► Joined ──► Leaving ──► Left
///   ▲         │                     ▲
///   └─────────┘ (join failed)       │
///             └─────────────────────┘ (leave during join)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Constructed or reset, not in a room
    #[default]
    Idle,
    /// Join request and transport negotiation in flight
    Joining,
    /// In the room with both transports negotiated
    Joined,
    /// Tearing down producers, consumers and transports
    Leaving,
    /// Terminal until the session is reset
    Left,
}

impl SessionState {
    /// Whether a join may start from this state
    pub fn can_join(self) -> bool {
        self == SessionState::Idle
    }

    /// Whether the session may be reset from this state
    pub fn can_reset(self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Left)
    }

    /// Whether the session holds negotiated transports
    pub fn is_joined(self) -> bool {
        self == SessionState::Joined
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, next),
            (Idle, Joining)
                | (Joining, Joined)
                | (Joining, Idle)
                | (Joining, Leaving)
                | (Joined, Leaving)
                | (Leaving, Left)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Joining => "joining",
            SessionState::Joined => "joined",
            SessionState::Leaving => "leaving",
            SessionState::Left => "left",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
