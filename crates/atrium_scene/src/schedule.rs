//! Host-driven lifecycle hooks and the per-peer scene aggregate.

use std::time::Duration;

use atrium_net::{BroadcastTransport, ReceivedBroadcast, TransportEvent};
use atrium_protocol::{CHANNEL_INTERACTION, EntityId, InteractionCommand};
use tracing::{debug, info};

use crate::context::{PeerContext, PeerRoster};
use crate::engine::{PhysicsBody, PromptUi};
use crate::interaction::{Admission, Interactable, InteractionSync, ToggleState};
use crate::movement::{InputSample, MovementController};
use crate::proximity::{ProximityDetector, VolumeCrossing};

/// Host-driven lifecycle hooks.
///
/// The embedding engine owns the loop and the clock: it calls `on_init`
/// once, `on_frame_tick` at its variable frame rate and `on_physics_tick` at
/// its fixed rate. Implementations must not assume they drive either.
pub trait SceneHooks {
    fn on_init(&mut self);
    fn on_frame_tick(&mut self, dt: Duration, input: &InputSample);
    fn on_physics_tick(&mut self, dt: Duration);
}

/// This peer's copy of the scene: movement, proximity, interactables and the
/// toggle synchronizer, wired to one transport.
///
/// Nothing here blocks or suspends the host loop. The session clock is the
/// sum of frame deltas handed in by the driver; the core never reads a wall
/// clock of its own.
pub struct ScenePeer<T: BroadcastTransport, B: PhysicsBody> {
    context: PeerContext,
    clock: Duration,
    roster: PeerRoster,
    transport: T,
    detector: ProximityDetector,
    movement: MovementController<B>,
    sync: InteractionSync,
    prompts: Box<dyn PromptUi>,
}

impl<T: BroadcastTransport, B: PhysicsBody> ScenePeer<T, B> {
    pub fn new(
        context: PeerContext,
        transport: T,
        movement: MovementController<B>,
        prompts: Box<dyn PromptUi>,
    ) -> Self {
        let roster = PeerRoster::new(&context);
        let detector = ProximityDetector::new(context.peer_id());
        let sync = InteractionSync::new(&context);
        Self {
            context,
            clock: Duration::ZERO,
            roster,
            transport,
            detector,
            movement,
            sync,
            prompts,
        }
    }

    /// Adds one interactable and registers its detection zone. The scene
    /// topology is fixed after setup; entities are never removed.
    pub fn add_interactable(&mut self, entity: Interactable) {
        self.detector
            .register_zone(entity.zone_tag().to_owned(), entity.id());
        self.sync.add(entity);
    }

    pub fn context(&self) -> &PeerContext {
        &self.context
    }

    pub fn roster(&self) -> &PeerRoster {
        &self.roster
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn movement(&self) -> &MovementController<B> {
        &self.movement
    }

    pub fn movement_mut(&mut self) -> &mut MovementController<B> {
        &mut self.movement
    }

    pub fn entity_state(&self, id: EntityId) -> Option<ToggleState> {
        self.sync.entity(id).map(Interactable::state)
    }

    pub fn is_near(&self, id: EntityId) -> bool {
        self.detector.is_near(id)
    }

    /// Local user input requested an interaction with `entity`.
    ///
    /// Called only in response to local input; remote peers' interactions
    /// reach this scene as broadcasts. Proximity is deliberately not checked
    /// here; nearness drives the prompt and the cooldown gate decides
    /// admission.
    pub fn try_interact(&mut self, entity: EntityId) -> Admission {
        let command = InteractionCommand {
            entity,
            timestamp: self.clock,
        };
        self.sync.submit(command, &self.transport)
    }

    /// Trigger-volume enter callback from the physics collaborator, invoked
    /// only for the local peer's own collider.
    pub fn on_volume_enter(&mut self, tag: &str) {
        match self.detector.on_volume_enter(tag, self.clock) {
            VolumeCrossing::Ground => self.movement.ground_entered(),
            VolumeCrossing::Zone(event) => {
                debug!(entity = %event.entity, "entered detection zone");
                if let Some(entity) = self.sync.entity(event.entity) {
                    let text = entity.prompt().to_owned();
                    self.prompts.show_prompt(event.entity, &text);
                }
            }
            VolumeCrossing::Ignored => {}
        }
    }

    /// Trigger-volume exit callback from the physics collaborator.
    pub fn on_volume_exit(&mut self, tag: &str) {
        match self.detector.on_volume_exit(tag, self.clock) {
            VolumeCrossing::Ground => self.movement.ground_exited(),
            VolumeCrossing::Zone(event) => {
                debug!(entity = %event.entity, "left detection zone");
                self.prompts.hide_prompt(event.entity);
            }
            VolumeCrossing::Ignored => {}
        }
    }

    /// Membership event from the transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        self.roster.apply(&event);
    }

    /// One delivered broadcast, applied immediately upon receipt. Reception
    /// is asynchronous relative to tick boundaries; nothing is buffered into
    /// the next tick.
    pub fn handle_broadcast(&mut self, received: &ReceivedBroadcast) {
        match received.channel {
            CHANNEL_INTERACTION => self.sync.handle_payload(&received.payload),
            channel => debug!(channel, "broadcast on unknown channel dropped"),
        }
    }
}

impl<T: BroadcastTransport, B: PhysicsBody> SceneHooks for ScenePeer<T, B> {
    fn on_init(&mut self) {
        self.sync.initialize();
        info!(peer = %self.context.display_name(), "scene initialized");
    }

    fn on_frame_tick(&mut self, dt: Duration, input: &InputSample) {
        self.clock += dt;
        self.movement.on_frame_tick(input);
    }

    fn on_physics_tick(&mut self, dt: Duration) {
        self.movement.on_physics_tick(dt);
    }
}
