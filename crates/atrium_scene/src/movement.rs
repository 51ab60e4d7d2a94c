//! Directional movement and the grounded/jump interlock.
//!
//! Runs on two rates: input is sampled and jump edges are handled at frame
//! rate, motion integrates at the fixed physics rate. This path is
//! independent of the interaction core and shares only the proximity
//! detector's ground crossings.

use std::time::Duration;

use glam::{Vec2, Vec3};
use tracing::warn;

use crate::config::PlayerConfig;
use crate::engine::{AnimationRig, PhysicsBody};

const PARAM_SPEED: &str = "Speed";
const PARAM_GROUNDED: &str = "IsGrounded";
const PARAM_JUMPING: &str = "IsJumping";

/// Directional input below this magnitude is treated as no input.
const INPUT_DEAD_ZONE: f32 = 0.01;

/// Input sampled by the host once per frame tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    /// Two-axis directional input, x = strafe, y = forward. Not necessarily
    /// normalized; the controller normalizes.
    pub axes: Vec2,
    /// True on the frame the jump input was pressed. Edge semantics are the
    /// host input layer's responsibility.
    pub jump: bool,
}

/// Integrates directional input into physics motion and jump impulses for
/// the local peer's body.
pub struct MovementController<B: PhysicsBody> {
    body: B,
    rig: Option<Box<dyn AnimationRig>>,
    speed: f32,
    jump_force: f32,
    direction: Vec3,
    grounded: bool,
    jumping: bool,
}

impl<B: PhysicsBody> MovementController<B> {
    pub fn new(config: PlayerConfig, body: B) -> Self {
        Self {
            body,
            rig: None,
            speed: config.move_speed,
            jump_force: config.jump_force,
            direction: Vec3::ZERO,
            grounded: true,
            jumping: false,
        }
    }

    pub fn with_rig(mut self, rig: Box<dyn AnimationRig>) -> Self {
        self.rig = Some(rig);
        self
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn jumping(&self) -> bool {
        self.jumping
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Updates the movement speed. Negative speeds are refused with a
    /// warning and the current speed is kept.
    pub fn set_speed(&mut self, speed: f32) {
        if !(speed.is_finite() && speed >= 0.0) {
            warn!(speed, "refusing invalid movement speed");
            return;
        }
        self.speed = speed;
    }

    /// Frame-rate half: samples input into a unit direction, handles the
    /// jump edge and pushes animation parameters.
    pub fn on_frame_tick(&mut self, input: &InputSample) {
        let planar = Vec3::new(input.axes.x, 0.0, input.axes.y);
        self.direction = if planar.length() > INPUT_DEAD_ZONE {
            planar.normalize()
        } else {
            Vec3::ZERO
        };

        if input.jump && self.grounded && !self.jumping {
            self.body.apply_impulse(Vec3::Y * self.jump_force);
            self.jumping = true;
            self.grounded = false;
        }

        if let Some(rig) = self.rig.as_deref_mut() {
            rig.set_float(PARAM_SPEED, self.direction.length());
            rig.set_bool(PARAM_GROUNDED, self.grounded);
            rig.set_bool(PARAM_JUMPING, self.jumping);
        }
    }

    /// Fixed-rate half: integrates the sampled direction into motion through
    /// the physics collaborator's move primitive.
    pub fn on_physics_tick(&mut self, dt: Duration) {
        if self.direction == Vec3::ZERO {
            return;
        }
        let step = self.direction * self.speed * dt.as_secs_f32();
        let target = self.body.position() + step;
        self.body.move_to(target);
    }

    /// Ground re-entry reported by the proximity detector.
    pub fn ground_entered(&mut self) {
        self.grounded = true;
        self.jumping = false;
    }

    /// The body left the ground volume.
    pub fn ground_exited(&mut self) {
        self.grounded = false;
    }

    pub fn body(&self) -> &B {
        &self.body
    }
}
