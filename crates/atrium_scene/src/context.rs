//! Peer identity and session roster.

use std::collections::HashMap;

use atrium_net::TransportEvent;
use atrium_protocol::PeerId;
use tracing::{debug, warn};

/// Identity of the peer this scene copy runs on.
///
/// Passed to components at construction instead of a global "local player"
/// lookup, so every component states its dependency on peer identity
/// explicitly.
#[derive(Debug, Clone)]
pub struct PeerContext {
    peer_id: PeerId,
    display_name: String,
}

impl PeerContext {
    pub fn new(peer_id: PeerId, display_name: impl Into<String>) -> Self {
        Self {
            peer_id,
            display_name: display_name.into(),
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Whether a peer is this process or a remote participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    Local,
    Remote,
}

/// One participant in the session as seen from this peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: PeerId,
    pub display_name: String,
    pub locality: Locality,
}

/// Session roster mirrored from transport membership events.
///
/// The transport owns peer lifecycle; this is a per-peer view that follows
/// its join/leave events and never invents entries of its own (apart from
/// the local peer, which is known at construction).
#[derive(Debug)]
pub struct PeerRoster {
    peers: HashMap<PeerId, Peer>,
}

impl PeerRoster {
    pub fn new(context: &PeerContext) -> Self {
        let local = Peer {
            id: context.peer_id(),
            display_name: context.display_name().to_owned(),
            locality: Locality::Local,
        };
        Self {
            peers: HashMap::from([(local.id, local)]),
        }
    }

    /// Applies one membership event from the transport.
    pub fn apply(&mut self, event: &TransportEvent) {
        match event {
            TransportEvent::PeerJoined { peer, display_name } => {
                debug!(%peer, display_name, "peer joined session");
                self.peers.insert(
                    *peer,
                    Peer {
                        id: *peer,
                        display_name: display_name.clone(),
                        locality: Locality::Remote,
                    },
                );
            }
            TransportEvent::PeerLeft { peer } => {
                if self.peers.remove(peer).is_none() {
                    warn!(%peer, "leave event for unknown peer");
                }
            }
        }
    }

    pub fn get(&self, peer: PeerId) -> Option<&Peer> {
        self.peers.get(&peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn roster_follows_membership_events() {
        let context = PeerContext::new(Uuid::new_v4(), "alpha");
        let mut roster = PeerRoster::new(&context);
        assert_eq!(roster.len(), 1);

        let beta = Uuid::new_v4();
        roster.apply(&TransportEvent::PeerJoined {
            peer: beta,
            display_name: "beta".into(),
        });
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(beta).unwrap().locality, Locality::Remote);
        assert_eq!(
            roster.get(context.peer_id()).unwrap().locality,
            Locality::Local
        );

        roster.apply(&TransportEvent::PeerLeft { peer: beta });
        assert_eq!(roster.len(), 1);
    }
}
