//! Headless demo session: two peers share a scene over the loopback mesh.
//!
//! The guest walks into the lever's detection zone and pulls it; the toggle
//! replicates to the host. A second round pulls concurrently on both peers
//! to show the documented divergence-and-reconvergence round trip.

use std::time::Duration;

use anyhow::Result;
use atrium_net::{LoopbackMesh, LoopbackReceiver, LoopbackSender};
use atrium_protocol::EntityId;
use atrium_scene::engine::PhysicsBody;
use atrium_scene::stub::{
    CountingAudio, CountingParticles, KinematicBody, RecordingPrompts, RecordingRig,
    RecordingSurface,
};
use atrium_scene::{
    FeedbackApplier, InputSample, Interactable, MovementController, PeerContext, SceneConfig,
    SceneHooks, ScenePeer,
};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LEVER: EntityId = EntityId(1);
const FRAME: Duration = Duration::from_millis(16);

const SCENE: &str = r#"(
    player: (move_speed: 5.0, jump_force: 10.0),
    interactables: [
        (id: 1, zone_tag: "lever_zone", prompt: "Pull the lever", cooldown_secs: 1.0),
    ],
    physics_hz: 50.0,
)"#;

struct DemoPeer {
    scene: ScenePeer<LoopbackSender, KinematicBody>,
    receiver: LoopbackReceiver,
    accumulator: Duration,
    physics_dt: Duration,
}

impl DemoPeer {
    fn join(mesh: &LoopbackMesh, name: &str, config: &SceneConfig) -> Self {
        let (sender, receiver) = mesh.join(name);
        let context = PeerContext::new(sender.peer_id(), name);

        let lever = &config.interactables[0];
        let feedback =
            FeedbackApplier::new(lever.feedback.clone(), Box::new(RecordingSurface::new()))
                .with_rig(Box::new(RecordingRig::new()))
                .with_audio(Box::new(CountingAudio::new()))
                .with_particles(Box::new(CountingParticles::new()));

        let movement = MovementController::new(config.player, KinematicBody::new());
        let mut scene = ScenePeer::new(
            context,
            sender,
            movement,
            Box::new(RecordingPrompts::new()),
        );
        scene.add_interactable(Interactable::new(lever, feedback));
        scene.on_init();

        Self {
            scene,
            receiver,
            accumulator: Duration::ZERO,
            physics_dt: Duration::from_secs_f64(1.0 / config.physics_hz),
        }
    }

    /// One driver step: frame tick, any due physics ticks, then immediate
    /// application of whatever the transport delivered in the meantime.
    fn step(&mut self, input: &InputSample) {
        self.scene.on_frame_tick(FRAME, input);
        self.accumulator += FRAME;
        while self.accumulator >= self.physics_dt {
            self.scene.on_physics_tick(self.physics_dt);
            self.accumulator -= self.physics_dt;
        }
        self.pump();
    }

    fn pump(&mut self) {
        let mut events = Vec::new();
        self.receiver.poll_events(&mut events);
        for event in events {
            self.scene.handle_transport_event(event);
        }

        let mut received = Vec::new();
        self.receiver.poll_broadcasts(&mut received);
        for broadcast in &received {
            self.scene.handle_broadcast(broadcast);
        }
    }

    fn idle(&mut self) {
        self.step(&InputSample::default());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SceneConfig::from_str(SCENE)?;
    let mesh = LoopbackMesh::new();
    let mut host = DemoPeer::join(&mesh, "host", &config);
    let mut guest = DemoPeer::join(&mesh, "guest", &config);
    host.pump();
    guest.pump();
    info!(peers = host.scene.roster().len(), "session established");

    // The guest walks toward the lever for half a second.
    let walk = InputSample {
        axes: Vec2::new(0.0, 1.0),
        jump: false,
    };
    for _ in 0..30 {
        guest.step(&walk);
        host.idle();
    }
    info!(
        position = ?guest.scene.movement().body().position(),
        "guest stopped at the lever"
    );

    guest.scene.on_volume_enter("lever_zone");
    let admission = guest.scene.try_interact(LEVER);
    info!(?admission, "guest pulled the lever");

    host.idle();
    guest.idle();
    info!(
        host = ?host.scene.entity_state(LEVER),
        guest = ?guest.scene.entity_state(LEVER),
        "lever state after one replicated interaction"
    );

    // Let the cooldown window pass on both peers.
    for _ in 0..70 {
        host.idle();
        guest.idle();
    }

    // Concurrent pulls inside one round trip: both flip locally, then each
    // applies the other's signal and lands back where it started.
    let host_admission = host.scene.try_interact(LEVER);
    let guest_admission = guest.scene.try_interact(LEVER);
    info!(
        ?host_admission,
        ?guest_admission,
        host = ?host.scene.entity_state(LEVER),
        guest = ?guest.scene.entity_state(LEVER),
        "concurrent pulls before delivery"
    );

    host.idle();
    guest.idle();
    info!(
        host = ?host.scene.entity_state(LEVER),
        guest = ?guest.scene.entity_state(LEVER),
        "lever state after the concurrent round trip"
    );

    guest.scene.on_volume_exit("lever_zone");
    mesh.leave(guest.scene.context().peer_id());
    host.idle();
    info!(peers = host.scene.roster().len(), "guest left the session");

    Ok(())
}
