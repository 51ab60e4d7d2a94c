//! Cooldown gate, interactable state and the toggle synchronizer.
//!
//! The toggle state machine has two states and a single transition: flip to
//! the other state. Both trigger paths, a locally admitted interaction and a
//! received broadcast, funnel through the same toggle routine, so local and
//! remote applications are indistinguishable at the entity level. What they
//! do differ in is the cooldown window, which only local attempts touch.

use std::{collections::HashMap, time::Duration};

use atrium_net::{BroadcastScope, BroadcastTransport};
use atrium_protocol::{
    CHANNEL_INTERACTION, EntityId, InteractionCommand, PeerId, SyncBroadcast, TimestampMs,
};
use bytes::Bytes;
use tracing::{debug, info, trace, warn};

use crate::config::{InteractableConfig, ReplicationMode};
use crate::context::PeerContext;
use crate::feedback::FeedbackApplier;

/// Binary toggle state of one interactable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Idle,
    Activated,
}

impl ToggleState {
    /// The complement; the only transition this state machine has.
    pub fn flipped(self) -> Self {
        match self {
            Self::Idle => Self::Activated,
            Self::Activated => Self::Idle,
        }
    }
}

/// Outcome of a local interaction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The attempt fell inside the cooldown window. Silently ignored
    /// upstream; not an error and not logged as a failure.
    CooldownActive,
    /// No interactable with the requested id exists in this scene.
    UnknownEntity,
}

/// This peer's copy of one interactable object.
///
/// The state field is private: the only mutations are the toggle routine
/// shared by both trigger paths and the init-time reset. Entities are created
/// at scene load and live for the whole session.
pub struct Interactable {
    id: EntityId,
    state: ToggleState,
    cooldown: Duration,
    last_local_attempt: Option<Duration>,
    replication: ReplicationMode,
    prompt: String,
    zone_tag: String,
    feedback: FeedbackApplier,
}

impl Interactable {
    pub fn new(config: &InteractableConfig, feedback: FeedbackApplier) -> Self {
        Self {
            id: config.entity_id(),
            state: ToggleState::Idle,
            cooldown: config.cooldown(),
            last_local_attempt: None,
            replication: config.replication,
            prompt: config.prompt.clone(),
            zone_tag: config.zone_tag.clone(),
            feedback,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn replication(&self) -> ReplicationMode {
        self.replication
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn zone_tag(&self) -> &str {
        &self.zone_tag
    }

    /// Cooldown gate for local attempts.
    ///
    /// Measured purely against this peer's own clock and attempt history. A
    /// fresh entity admits its first attempt unconditionally; remote-sourced
    /// toggles never touch the window, so another peer's activity can neither
    /// lock this peer out nor reset its cooldown.
    fn admit(&mut self, now: Duration) -> Admission {
        if let Some(last) = self.last_local_attempt {
            if now.saturating_sub(last) < self.cooldown {
                return Admission::Rejected(RejectReason::CooldownActive);
            }
        }
        self.last_local_attempt = Some(now);
        Admission::Admitted
    }

    /// The single toggle routine used by both trigger paths.
    fn apply_toggle(&mut self) -> ToggleState {
        self.state = self.state.flipped();
        self.feedback.on_toggled(self.state);
        self.state
    }

    /// Resets to the initial state and re-applies the projection so render
    /// state matches from the first frame.
    fn reset(&mut self) {
        self.state = ToggleState::Idle;
        self.last_local_attempt = None;
        self.feedback.refresh(self.state);
    }
}

/// Applies admitted local commands and received broadcasts to this peer's
/// entity copies. This is the single place toggles happen.
pub struct InteractionSync {
    local_peer: PeerId,
    local_name: String,
    entities: HashMap<EntityId, Interactable>,
}

impl InteractionSync {
    pub fn new(context: &PeerContext) -> Self {
        Self {
            local_peer: context.peer_id(),
            local_name: context.display_name().to_owned(),
            entities: HashMap::new(),
        }
    }

    pub fn add(&mut self, entity: Interactable) {
        let id = entity.id;
        if self.entities.insert(id, entity).is_some() {
            warn!(entity = %id, "interactable registered twice, replacing");
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Interactable> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Interactable> {
        self.entities.values()
    }

    /// Validates collaborator wiring and resets every entity. Runs once from
    /// `on_init`.
    pub(crate) fn initialize(&mut self) {
        for entity in self.entities.values_mut() {
            entity.feedback.validate(entity.id);
            entity.reset();
        }
    }

    /// Local trigger path: gate, flip, project, then hand the flip signal to
    /// the transport. The broadcast is fire-and-forget and carries no state
    /// value; a `LocalOnly` entity skips it entirely.
    ///
    /// Only ever called in response to local user input; remote peers'
    /// interactions arrive as broadcasts through [`Self::handle_payload`].
    pub fn submit<T: BroadcastTransport>(
        &mut self,
        command: InteractionCommand,
        transport: &T,
    ) -> Admission {
        let Some(entity) = self.entities.get_mut(&command.entity) else {
            warn!(entity = %command.entity, "interaction attempt on unknown entity");
            return Admission::Rejected(RejectReason::UnknownEntity);
        };

        match entity.admit(command.timestamp) {
            Admission::Admitted => {}
            rejected => {
                trace!(entity = %command.entity, "attempt inside cooldown window");
                return rejected;
            }
        }

        let state = entity.apply_toggle();
        info!(
            entity = %command.entity,
            ?state,
            by = %self.local_name,
            "interaction applied"
        );

        if entity.replication == ReplicationMode::Networked {
            let broadcast = SyncBroadcast {
                entity: command.entity,
                origin: self.local_peer,
                timestamp: command.timestamp.as_millis() as TimestampMs,
            };
            transport.broadcast(
                BroadcastScope::AllPeers,
                CHANNEL_INTERACTION,
                Bytes::from(broadcast.encode()),
            );
        }

        Admission::Admitted
    }

    /// Remote trigger path: the identical flip, with the cooldown window left
    /// untouched.
    ///
    /// Self-originated echoes are dropped so a transport that loops
    /// broadcasts back to the sender cannot double-flip.
    pub fn apply_remote(&mut self, broadcast: &SyncBroadcast) {
        if broadcast.origin == self.local_peer {
            trace!(entity = %broadcast.entity, "ignoring own echo");
            return;
        }
        let Some(entity) = self.entities.get_mut(&broadcast.entity) else {
            warn!(entity = %broadcast.entity, "broadcast for unknown entity");
            return;
        };
        let state = entity.apply_toggle();
        debug!(
            entity = %broadcast.entity,
            ?state,
            origin = %broadcast.origin,
            "remote toggle applied"
        );
    }

    /// Decodes and applies one raw payload from the interaction channel. A
    /// payload that does not decode is logged and dropped, never applied.
    pub fn handle_payload(&mut self, payload: &[u8]) {
        match SyncBroadcast::decode(payload) {
            Ok(broadcast) => self.apply_remote(&broadcast),
            Err(err) => warn!(error = %err, "dropping malformed toggle broadcast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedbackConfig;
    use crate::stub::{RecordingSurface, RecordingTransport};
    use uuid::Uuid;

    const LEVER: EntityId = EntityId(1);

    fn lever_config(cooldown_secs: f32, replication: ReplicationMode) -> InteractableConfig {
        InteractableConfig {
            id: LEVER.0,
            zone_tag: "lever_zone".into(),
            prompt: "Pull the lever".into(),
            cooldown_secs,
            replication,
            feedback: FeedbackConfig::default(),
        }
    }

    fn sync_with(config: &InteractableConfig) -> (InteractionSync, RecordingSurface) {
        let context = PeerContext::new(Uuid::new_v4(), "alpha");
        let mut sync = InteractionSync::new(&context);
        let surface = RecordingSurface::new();
        let feedback = FeedbackApplier::new(config.feedback.clone(), Box::new(surface.clone()));
        sync.add(Interactable::new(config, feedback));
        sync.initialize();
        (sync, surface)
    }

    fn command_at(secs: f64) -> InteractionCommand {
        InteractionCommand {
            entity: LEVER,
            timestamp: Duration::from_secs_f64(secs),
        }
    }

    #[test]
    fn attempt_inside_the_window_is_rejected_without_a_flip() {
        let config = lever_config(1.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        assert_eq!(
            sync.submit(command_at(0.5), &transport),
            Admission::Admitted
        );
        assert_eq!(
            sync.submit(command_at(1.2), &transport),
            Admission::Rejected(RejectReason::CooldownActive)
        );
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Activated);
        assert_eq!(transport.count(), 1);
    }

    #[test]
    fn attempt_past_the_window_flips_exactly_once() {
        let config = lever_config(1.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        sync.submit(command_at(0.0), &transport);
        assert_eq!(
            sync.submit(command_at(1.0), &transport),
            Admission::Admitted
        );
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Idle);
        assert_eq!(transport.count(), 2);
    }

    #[test]
    fn zero_cooldown_admits_every_attempt() {
        let config = lever_config(0.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        for _ in 0..3 {
            assert_eq!(
                sync.submit(command_at(0.25), &transport),
                Admission::Admitted
            );
        }
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Activated);
    }

    #[test]
    fn first_attempt_is_never_cooldown_locked() {
        let config = lever_config(10.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        assert_eq!(
            sync.submit(command_at(0.0), &transport),
            Admission::Admitted
        );
    }

    #[test]
    fn remote_toggle_leaves_the_cooldown_window_untouched() {
        let config = lever_config(1.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        sync.submit(command_at(0.0), &transport);
        sync.apply_remote(&SyncBroadcast {
            entity: LEVER,
            origin: Uuid::new_v4(),
            timestamp: 600,
        });
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Idle);

        // Still inside the window opened by the local attempt at t=0.
        assert_eq!(
            sync.submit(command_at(0.9), &transport),
            Admission::Rejected(RejectReason::CooldownActive)
        );
    }

    #[test]
    fn own_echo_does_not_double_flip() {
        let config = lever_config(1.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        sync.submit(command_at(0.0), &transport);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].scope, BroadcastScope::AllPeers);

        sync.handle_payload(&sent[0].payload);
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Activated);
    }

    #[test]
    fn local_only_entities_never_broadcast() {
        let config = lever_config(0.0, ReplicationMode::LocalOnly);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        sync.submit(command_at(0.0), &transport);
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Activated);
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let config = lever_config(1.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);
        let transport = RecordingTransport::new();

        let command = InteractionCommand {
            entity: EntityId(99),
            timestamp: Duration::ZERO,
        };
        assert_eq!(
            sync.submit(command, &transport),
            Admission::Rejected(RejectReason::UnknownEntity)
        );
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn malformed_payload_is_dropped_without_a_flip() {
        let config = lever_config(1.0, ReplicationMode::Networked);
        let (mut sync, _surface) = sync_with(&config);

        sync.handle_payload(&[0xde, 0xad]);
        assert_eq!(sync.entity(LEVER).unwrap().state(), ToggleState::Idle);
    }
}
