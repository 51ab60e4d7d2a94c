//! Loopback transport for in-memory multi-peer communication.
//!
//! Keeps every peer of a session in the same process without touching the
//! network stack. Each peer gets its own inbox; a broadcast fans out into the
//! inboxes selected by the scope. This is primarily used for local runs and
//! tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use atrium_protocol::{ChannelId, PeerId};
use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use tracing::warn;
use uuid::Uuid;

use crate::events::{ReceivedBroadcast, TransportEvent};

use super::{BroadcastScope, BroadcastTransport};

/// Per-peer inbox capacity. A full inbox drops further broadcasts, matching
/// the best-effort delivery contract of the seam.
const INBOX_CAPACITY: usize = 256;

#[derive(Debug)]
struct PeerSlot {
    display_name: String,
    events: Sender<TransportEvent>,
    broadcasts: Sender<ReceivedBroadcast>,
}

#[derive(Debug, Default)]
struct MeshState {
    peers: Mutex<HashMap<PeerId, PeerSlot>>,
}

/// In-memory mesh connecting any number of peers in one process.
#[derive(Debug, Clone, Default)]
pub struct LoopbackMesh {
    state: Arc<MeshState>,
}

impl LoopbackMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a peer to the session and returns its transport halves.
    ///
    /// Existing members receive a `PeerJoined` event for the newcomer, and
    /// the newcomer's event queue is seeded with one `PeerJoined` per
    /// existing member so both sides converge on the same roster.
    pub fn join(&self, display_name: &str) -> (LoopbackSender, LoopbackReceiver) {
        let peer = Uuid::new_v4();
        let (event_tx, event_rx) = unbounded();
        let (broadcast_tx, broadcast_rx) = bounded(INBOX_CAPACITY);

        let mut peers = self.state.peers.lock().expect("mesh state poisoned");
        for (id, slot) in peers.iter() {
            let _ = slot.events.send(TransportEvent::PeerJoined {
                peer,
                display_name: display_name.to_owned(),
            });
            let _ = event_tx.send(TransportEvent::PeerJoined {
                peer: *id,
                display_name: slot.display_name.clone(),
            });
        }
        peers.insert(
            peer,
            PeerSlot {
                display_name: display_name.to_owned(),
                events: event_tx,
                broadcasts: broadcast_tx,
            },
        );

        (
            LoopbackSender {
                state: Arc::clone(&self.state),
                peer,
            },
            LoopbackReceiver {
                peer,
                events: event_rx,
                broadcasts: broadcast_rx,
            },
        )
    }

    /// Removes a peer from the session and notifies the remaining members.
    pub fn leave(&self, peer: PeerId) {
        let mut peers = self.state.peers.lock().expect("mesh state poisoned");
        if peers.remove(&peer).is_none() {
            warn!(%peer, "leave for a peer that is not a mesh member");
            return;
        }
        for slot in peers.values() {
            let _ = slot.events.send(TransportEvent::PeerLeft { peer });
        }
    }
}

/// Sending half of a peer's loopback connection.
#[derive(Debug, Clone)]
pub struct LoopbackSender {
    state: Arc<MeshState>,
    peer: PeerId,
}

impl LoopbackSender {
    pub fn peer_id(&self) -> PeerId {
        self.peer
    }
}

impl BroadcastTransport for LoopbackSender {
    fn broadcast(&self, scope: BroadcastScope, channel: ChannelId, payload: Bytes) {
        let peers = self.state.peers.lock().expect("mesh state poisoned");
        for (id, slot) in peers.iter() {
            if scope == BroadcastScope::OtherPeers && *id == self.peer {
                continue;
            }
            let received = ReceivedBroadcast {
                channel,
                payload: payload.clone(),
            };
            match slot.broadcasts.try_send(received) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(peer = %id, channel, "inbox full, dropping broadcast");
                }
                Err(TrySendError::Disconnected(_)) => {
                    warn!(peer = %id, channel, "inbox gone, dropping broadcast");
                }
            }
        }
    }
}

/// Receiving half of a peer's loopback connection.
///
/// The driver owning the receiver hands drained payloads to the scene's
/// broadcast handler as soon as they arrive; nothing here defers delivery to
/// a tick boundary.
#[derive(Debug)]
pub struct LoopbackReceiver {
    peer: PeerId,
    events: Receiver<TransportEvent>,
    broadcasts: Receiver<ReceivedBroadcast>,
}

impl LoopbackReceiver {
    pub fn peer_id(&self) -> PeerId {
        self.peer
    }

    /// Drains pending membership events into `output`.
    pub fn poll_events(&mut self, output: &mut Vec<TransportEvent>) {
        output.extend(self.events.try_iter());
    }

    /// Drains pending broadcasts into `output`.
    pub fn poll_broadcasts(&mut self, output: &mut Vec<ReceivedBroadcast>) {
        output.extend(self.broadcasts.try_iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_events(receiver: &mut LoopbackReceiver) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        receiver.poll_events(&mut events);
        events
    }

    fn drain_broadcasts(receiver: &mut LoopbackReceiver) -> Vec<ReceivedBroadcast> {
        let mut received = Vec::new();
        receiver.poll_broadcasts(&mut received);
        received
    }

    #[test]
    fn join_converges_rosters_on_both_sides() {
        let mesh = LoopbackMesh::new();
        let (alpha_tx, mut alpha_rx) = mesh.join("alpha");
        let (beta_tx, mut beta_rx) = mesh.join("beta");

        assert!(matches!(
            drain_events(&mut alpha_rx).as_slice(),
            [TransportEvent::PeerJoined { peer, display_name }]
            if *peer == beta_tx.peer_id() && display_name == "beta"
        ));
        assert!(matches!(
            drain_events(&mut beta_rx).as_slice(),
            [TransportEvent::PeerJoined { peer, display_name }]
            if *peer == alpha_tx.peer_id() && display_name == "alpha"
        ));
    }

    #[test]
    fn all_peers_scope_includes_the_sender() {
        let mesh = LoopbackMesh::new();
        let (alpha_tx, mut alpha_rx) = mesh.join("alpha");
        let (_beta_tx, mut beta_rx) = mesh.join("beta");

        alpha_tx.broadcast(BroadcastScope::AllPeers, 0, Bytes::from_static(b"flip"));

        assert_eq!(drain_broadcasts(&mut alpha_rx).len(), 1);
        assert_eq!(drain_broadcasts(&mut beta_rx).len(), 1);
    }

    #[test]
    fn other_peers_scope_excludes_the_sender() {
        let mesh = LoopbackMesh::new();
        let (alpha_tx, mut alpha_rx) = mesh.join("alpha");
        let (_beta_tx, mut beta_rx) = mesh.join("beta");
        let (_gamma_tx, mut gamma_rx) = mesh.join("gamma");

        alpha_tx.broadcast(BroadcastScope::OtherPeers, 0, Bytes::from_static(b"flip"));

        assert!(drain_broadcasts(&mut alpha_rx).is_empty());
        assert_eq!(drain_broadcasts(&mut beta_rx).len(), 1);
        assert_eq!(drain_broadcasts(&mut gamma_rx).len(), 1);
    }

    #[test]
    fn leave_notifies_remaining_members() {
        let mesh = LoopbackMesh::new();
        let (alpha_tx, mut alpha_rx) = mesh.join("alpha");
        let (beta_tx, mut beta_rx) = mesh.join("beta");
        drain_events(&mut alpha_rx);
        drain_events(&mut beta_rx);

        mesh.leave(beta_tx.peer_id());

        assert!(matches!(
            drain_events(&mut alpha_rx).as_slice(),
            [TransportEvent::PeerLeft { peer }] if *peer == beta_tx.peer_id()
        ));
        let _ = alpha_tx;
    }

    #[test]
    fn full_inbox_drops_instead_of_blocking() {
        let mesh = LoopbackMesh::new();
        let (alpha_tx, _alpha_rx) = mesh.join("alpha");
        let (_beta_tx, mut beta_rx) = mesh.join("beta");

        for _ in 0..(INBOX_CAPACITY + 10) {
            alpha_tx.broadcast(BroadcastScope::OtherPeers, 0, Bytes::from_static(b"flip"));
        }

        assert_eq!(drain_broadcasts(&mut beta_rx).len(), INBOX_CAPACITY);
    }
}
