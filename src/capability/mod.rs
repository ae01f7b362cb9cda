//! Device capability negotiation
//!
//! The router's RTP capabilities arrive with the join response and are
//! loaded into the engine device once per session. Every produce or
//! consume decision is checked against the loaded device first.

pub mod negotiator;

pub use negotiator::CapabilityNegotiator;
