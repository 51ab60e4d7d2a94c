//! Per-peer interaction and state-replication core for a shared scene.
//!
//! One [`ScenePeer`] holds this peer's copy of every interactable, the local
//! movement controller and the proximity state. The embedding host drives it
//! through the [`SceneHooks`] lifecycle and the physics collaborator's
//! trigger-volume callbacks; received broadcasts are handed in through
//! [`ScenePeer::handle_broadcast`] the moment the transport delivers them.
//!
//! Every engine-side capability (physics body, render override surface,
//! animation rig, audio, particles, prompt UI) is a trait defined in
//! [`engine`], passed in at construction. The core owns no clock, no loop and
//! no global state.

/// Scene-authoring configuration.
pub mod config;
/// Peer identity and session roster.
pub mod context;
/// Collaborator traits implemented by the embedding host.
pub mod engine;
/// Toggle projection onto render/animation/audio/particle collaborators.
pub mod feedback;
/// Cooldown gate, interactable state and the toggle synchronizer.
pub mod interaction;
/// Directional movement and the grounded/jump interlock.
pub mod movement;
/// Trigger-volume presence tracking.
pub mod proximity;
/// Host-driven lifecycle hooks and the per-peer scene aggregate.
pub mod schedule;
/// In-memory collaborator implementations for local runs and tests.
pub mod stub;

pub use config::{
    ConfigError, FeedbackConfig, InteractableConfig, PlayerConfig, ReplicationMode, SceneConfig,
};
pub use context::{Locality, Peer, PeerContext, PeerRoster};
pub use feedback::FeedbackApplier;
pub use interaction::{Admission, Interactable, InteractionSync, RejectReason, ToggleState};
pub use movement::{InputSample, MovementController};
pub use proximity::{ProximityDetector, VolumeCrossing, GROUND_TAG};
pub use schedule::{SceneHooks, ScenePeer};
