//! Events surfaced by the transport to the gameplay layer.

use atrium_protocol::{ChannelId, PeerId};
use bytes::Bytes;

/// Session membership changes.
///
/// Peers are created at session join and destroyed at session leave; their
/// lifecycle is owned by the transport. Gameplay mirrors these events into a
/// local roster and never invents peers of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    PeerJoined { peer: PeerId, display_name: String },
    PeerLeft { peer: PeerId },
}

/// A payload delivered to this peer by the transport.
///
/// The channel selects the receiving handler; the payload is opaque at this
/// layer and decoded by the handler it is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedBroadcast {
    pub channel: ChannelId,
    pub payload: Bytes,
}
