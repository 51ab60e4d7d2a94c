//! Message types shared by every peer in a scene session.
//!
//! Both the local interaction pipeline and the wire-facing broadcast use the
//! types defined here, so each peer's copy of the scene speaks the same
//! vocabulary. The only message that actually crosses the network is
//! [`SyncBroadcast`]; everything else is produced and consumed inside one
//! peer.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod messages;

pub use messages::{
    DecodeError, InteractionCommand, ProximityEvent, ProximityKind, SyncBroadcast, TimestampMs,
};

/// Identifies one participant process in the shared session.
pub type PeerId = uuid::Uuid;

/// Logical channel a broadcast is routed on. The receiving peer dispatches to
/// the handler registered for the channel, mirroring the transport contract.
pub type ChannelId = u8;

/// Channel carrying interaction toggle signals.
pub const CHANNEL_INTERACTION: ChannelId = 0;

/// Scene-authored identifier of an interactable object.
///
/// The scene topology is fixed: ids are assigned at scene load and are never
/// reused or retired mid-session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}
