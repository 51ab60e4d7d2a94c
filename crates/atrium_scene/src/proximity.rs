//! Trigger-volume presence tracking for the local peer.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use atrium_protocol::{EntityId, PeerId, ProximityEvent, ProximityKind};
use tracing::warn;

/// Tag carried by ground volumes.
pub const GROUND_TAG: &str = "ground";

/// Classification of one trigger-volume crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeCrossing {
    /// A ground volume; feeds the movement interlock.
    Ground,
    /// An interactable's detection zone.
    Zone(ProximityEvent),
    /// A tag this scene does not know.
    Ignored,
}

/// Observes the local peer's overlap with trigger volumes.
///
/// The physics collaborator invokes the volume callbacks only for the local
/// peer's own collider; remote peers never reach this detector. Nearness is
/// pure affordance for the prompt UI; the interaction gate does not consult
/// it, and none of this has any network effect.
pub struct ProximityDetector {
    local_peer: PeerId,
    zones: HashMap<String, EntityId>,
    near: HashSet<EntityId>,
}

impl ProximityDetector {
    pub fn new(local_peer: PeerId) -> Self {
        Self {
            local_peer,
            zones: HashMap::new(),
            near: HashSet::new(),
        }
    }

    /// Registers an interactable's detection-zone tag.
    pub fn register_zone(&mut self, tag: impl Into<String>, entity: EntityId) {
        let tag = tag.into();
        if tag == GROUND_TAG {
            warn!(%entity, "detection zone tagged as ground, ignoring registration");
            return;
        }
        if let Some(previous) = self.zones.insert(tag, entity) {
            warn!(%previous, %entity, "detection-zone tag registered twice");
        }
    }

    pub fn on_volume_enter(&mut self, tag: &str, now: Duration) -> VolumeCrossing {
        if tag == GROUND_TAG {
            return VolumeCrossing::Ground;
        }
        match self.zones.get(tag) {
            Some(&entity) => {
                self.near.insert(entity);
                VolumeCrossing::Zone(ProximityEvent {
                    peer: self.local_peer,
                    entity,
                    kind: ProximityKind::Enter,
                    timestamp: now,
                })
            }
            None => VolumeCrossing::Ignored,
        }
    }

    pub fn on_volume_exit(&mut self, tag: &str, now: Duration) -> VolumeCrossing {
        if tag == GROUND_TAG {
            return VolumeCrossing::Ground;
        }
        match self.zones.get(tag) {
            Some(&entity) => {
                self.near.remove(&entity);
                VolumeCrossing::Zone(ProximityEvent {
                    peer: self.local_peer,
                    entity,
                    kind: ProximityKind::Exit,
                    timestamp: now,
                })
            }
            None => VolumeCrossing::Ignored,
        }
    }

    /// Whether the local peer currently overlaps `entity`'s detection zone.
    pub fn is_near(&self, entity: EntityId) -> bool {
        self.near.contains(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const LEVER: EntityId = EntityId(1);

    fn detector() -> ProximityDetector {
        let mut detector = ProximityDetector::new(Uuid::new_v4());
        detector.register_zone("lever_zone", LEVER);
        detector
    }

    #[test]
    fn ground_crossings_are_classified_without_events() {
        let mut detector = detector();
        assert_eq!(
            detector.on_volume_enter(GROUND_TAG, Duration::ZERO),
            VolumeCrossing::Ground
        );
        assert_eq!(
            detector.on_volume_exit(GROUND_TAG, Duration::ZERO),
            VolumeCrossing::Ground
        );
    }

    #[test]
    fn zone_crossings_track_nearness_and_emit_events() {
        let mut detector = detector();
        assert!(!detector.is_near(LEVER));

        let crossing = detector.on_volume_enter("lever_zone", Duration::from_millis(16));
        assert!(matches!(
            crossing,
            VolumeCrossing::Zone(ProximityEvent {
                entity: LEVER,
                kind: ProximityKind::Enter,
                ..
            })
        ));
        assert!(detector.is_near(LEVER));

        let crossing = detector.on_volume_exit("lever_zone", Duration::from_millis(32));
        assert!(matches!(
            crossing,
            VolumeCrossing::Zone(ProximityEvent {
                entity: LEVER,
                kind: ProximityKind::Exit,
                ..
            })
        ));
        assert!(!detector.is_near(LEVER));
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let mut detector = detector();
        assert_eq!(
            detector.on_volume_enter("water", Duration::ZERO),
            VolumeCrossing::Ignored
        );
    }
}
