//! Transport trait and implementations.

pub mod loopback;

pub use loopback::{LoopbackMesh, LoopbackReceiver, LoopbackSender};

use atrium_protocol::ChannelId;
use bytes::Bytes;

/// Which peers a broadcast reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastScope {
    /// Every peer in the session, the sender included.
    AllPeers,
    /// Every peer except the sender.
    OtherPeers,
}

/// One-way broadcast into the transport's outbound queue.
///
/// Sends are fire-and-forget: there is no result channel, no acknowledgment,
/// no retry and no delivery confirmation. The call never blocks the update
/// loop.
pub trait BroadcastTransport {
    fn broadcast(&self, scope: BroadcastScope, channel: ChannelId, payload: Bytes);
}
