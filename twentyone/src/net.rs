//! Networking layer for discovery and game sessions.
//!
//! Servers advertise themselves with UDP offers and play sessions over TCP
//! using a fixed-length big-endian binary protocol. The server waits on
//! `mio` readiness so it can keep broadcasting while idle.

/// Blocking client and offer discovery.
pub mod client;

/// Network error types.
pub mod errors;

/// Wire formats for the four protocol messages.
pub mod messages;

/// Single-session server with a broadcast/accept event loop.
pub mod server;

/// Utilities for exact-length message framing.
pub mod utils;
