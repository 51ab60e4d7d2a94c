//! Collaborator traits implemented by the embedding host.
//!
//! Physics, rendering, animation, audio, particles and the prompt UI are
//! external to this subsystem; the core only talks to them through these
//! seams. The trigger-volume callbacks that feed the proximity detector are
//! the inverse direction of the same physics seam and arrive through
//! [`crate::ScenePeer::on_volume_enter`] / [`crate::ScenePeer::on_volume_exit`].

use atrium_protocol::EntityId;
use glam::Vec3;

/// RGBA color, linear components in `0.0..=1.0`.
pub type Rgba = [f32; 4];

/// Physics-side handle for one movable body.
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    /// Moves the body toward the target position, honoring collisions on the
    /// physics side.
    fn move_to(&mut self, target: Vec3);
    /// Applies an instantaneous impulse force.
    fn apply_impulse(&mut self, impulse: Vec3);
}

/// Render-state override surface for one scene object.
pub trait RenderSurface {
    fn set_override(&mut self, key: &str, color: Rgba);
    fn override_color(&self, key: &str) -> Option<Rgba>;
}

/// Animation parameter and trigger sink.
pub trait AnimationRig {
    /// Fires a one-shot trigger; the rig decides what plays.
    fn pulse(&mut self, trigger: &str);
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_float(&mut self, name: &str, value: f32);
}

/// One-shot audio cue source. No return value; playback failures stay on the
/// audio side.
pub trait AudioEmitter {
    fn play_one_shot(&mut self);
}

/// One-shot particle burst source.
pub trait ParticleEmitter {
    fn burst(&mut self);
}

/// Interaction prompt surface shown while the local peer is inside an
/// interactable's detection zone.
pub trait PromptUi {
    fn show_prompt(&mut self, entity: EntityId, text: &str);
    fn hide_prompt(&mut self, entity: EntityId);
}
