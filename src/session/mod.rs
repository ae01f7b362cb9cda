//! Session identity and lifecycle
//!
//! A session is one participant's stay in a room: the process-stable
//! [`PeerId`] it identifies itself with and the [`SessionState`] it moves
//! through from join to leave.

pub mod peer;
pub mod state;

pub use peer::PeerId;
pub use state::SessionState;
