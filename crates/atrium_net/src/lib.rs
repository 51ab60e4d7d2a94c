//! Broadcast transport seam between the interaction core and the session
//! backend.
//!
//! The real network stack (reliable delivery, peer discovery, session
//! membership) is an external collaborator. This crate exposes only the seam
//! the gameplay layer programs against (a fire-and-forget broadcast with a
//! target scope) plus an in-memory loopback mesh that keeps several peers in
//! the same process for local runs and tests.
//!
//! Delivery semantics at this seam are best-effort: unordered across peers,
//! possibly duplicated, possibly lost. None of that is detected here; it
//! surfaces only as state divergence between peers' copies of the scene.

/// Membership and delivery events surfaced to gameplay.
pub mod events;
/// Transport trait and implementations.
pub mod transport;

pub use events::{ReceivedBroadcast, TransportEvent};
pub use transport::{
    BroadcastScope, BroadcastTransport, LoopbackMesh, LoopbackReceiver, LoopbackSender,
};
