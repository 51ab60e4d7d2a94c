//! Interaction and presence messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EntityId, PeerId};

/// Milliseconds since session start, as stamped by the sending peer's own
/// clock. Peer clocks are not synchronized; the value is informational.
pub type TimestampMs = u64;

/// Which side of a detection-zone crossing occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityKind {
    Enter,
    Exit,
}

/// Presence change of the local peer relative to an interactable's detection
/// zone.
///
/// Produced and consumed within one tick; never persisted and never sent over
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityEvent {
    pub peer: PeerId,
    pub entity: EntityId,
    pub kind: ProximityKind,
    pub timestamp: Duration,
}

/// A local interaction attempt on an entity.
///
/// Produced only in response to local user input; never received from the
/// network. The timestamp is the local session clock at the moment of input
/// and feeds the cooldown gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionCommand {
    pub entity: EntityId,
    pub timestamp: Duration,
}

/// Toggle signal broadcast to every peer after a locally admitted
/// interaction.
///
/// Deliberately carries no state value: each receiver flips its own copy of
/// the entity. Peers therefore converge only when their prior states already
/// agreed and every broadcast applies exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBroadcast {
    pub entity: EntityId,
    pub origin: PeerId,
    pub timestamp: TimestampMs,
}

impl SyncBroadcast {
    /// Encodes the broadcast for the transport.
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("SyncBroadcast serialization cannot fail")
    }

    /// Decodes a broadcast from a raw transport payload.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        bincode::deserialize(payload).map_err(DecodeError::Malformed)
    }
}

/// Error produced when a received payload does not decode as a message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed broadcast payload: {0}")]
    Malformed(#[source] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_survives_the_wire() {
        let broadcast = SyncBroadcast {
            entity: EntityId(3),
            origin: uuid::Uuid::new_v4(),
            timestamp: 1_250,
        };

        let decoded = SyncBroadcast::decode(&broadcast.encode()).unwrap();
        assert_eq!(decoded, broadcast);
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert!(SyncBroadcast::decode(&[0xff]).is_err());
    }
}
