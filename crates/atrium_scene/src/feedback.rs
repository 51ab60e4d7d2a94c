//! Visual projection of an entity's toggle state.

use atrium_protocol::EntityId;
use tracing::warn;

use crate::config::FeedbackConfig;
use crate::engine::{AnimationRig, AudioEmitter, ParticleEmitter, RenderSurface, Rgba};
use crate::interaction::ToggleState;

/// Projects a toggle application onto the entity's render, animation, audio
/// and particle collaborators.
///
/// Holds nothing beyond the collaborator handles and the authored styling:
/// the render override is a pure function of the current toggle value and can
/// be re-derived at any time.
pub struct FeedbackApplier {
    style: FeedbackConfig,
    surface: Box<dyn RenderSurface>,
    rig: Option<Box<dyn AnimationRig>>,
    audio: Option<Box<dyn AudioEmitter>>,
    particles: Option<Box<dyn ParticleEmitter>>,
}

impl FeedbackApplier {
    pub fn new(style: FeedbackConfig, surface: Box<dyn RenderSurface>) -> Self {
        Self {
            style,
            surface,
            rig: None,
            audio: None,
            particles: None,
        }
    }

    pub fn with_rig(mut self, rig: Box<dyn AnimationRig>) -> Self {
        self.rig = Some(rig);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioEmitter>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_particles(mut self, particles: Box<dyn ParticleEmitter>) -> Self {
        self.particles = Some(particles);
        self
    }

    /// Logs one warning per absent optional collaborator. The affected
    /// effects degrade to no-ops; nothing here is fatal.
    pub(crate) fn validate(&self, entity: EntityId) {
        if self.audio.is_none() {
            warn!(%entity, "no audio emitter configured, interaction sound disabled");
        }
        if self.particles.is_none() {
            warn!(%entity, "no particle emitter configured, interaction burst disabled");
        }
        if self.rig.is_none() {
            warn!(%entity, "no animation rig configured, interaction pulse disabled");
        }
    }

    /// Re-applies the render override for `state` without firing one-shots.
    pub fn refresh(&mut self, state: ToggleState) {
        let color = self.color_for(state);
        self.surface.set_override(&self.style.override_key, color);
    }

    /// Projects one toggle application: the override plus the edge-triggered
    /// one-shots. Fires on every flip, in both directions.
    pub(crate) fn on_toggled(&mut self, state: ToggleState) {
        self.refresh(state);
        if let Some(rig) = self.rig.as_deref_mut() {
            rig.pulse(&self.style.pulse_trigger);
        }
        if let Some(audio) = self.audio.as_deref_mut() {
            audio.play_one_shot();
        }
        if let Some(particles) = self.particles.as_deref_mut() {
            particles.burst();
        }
    }

    fn color_for(&self, state: ToggleState) -> Rgba {
        match state {
            ToggleState::Idle => self.style.idle_color,
            ToggleState::Activated => self.style.activated_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{CountingAudio, CountingParticles, RecordingRig, RecordingSurface};

    fn applier(surface: &RecordingSurface) -> FeedbackApplier {
        FeedbackApplier::new(FeedbackConfig::default(), Box::new(surface.clone()))
    }

    #[test]
    fn projection_is_a_pure_function_of_state() {
        let surface = RecordingSurface::new();
        let mut feedback = applier(&surface);

        feedback.refresh(ToggleState::Activated);
        let first = surface.color("base_color");
        feedback.refresh(ToggleState::Activated);
        let second = surface.color("base_color");

        assert_eq!(first, second);
        assert_eq!(first, Some([0.0, 1.0, 0.0, 1.0]));

        feedback.refresh(ToggleState::Idle);
        assert_eq!(surface.color("base_color"), Some([1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn every_flip_fires_the_one_shots() {
        let surface = RecordingSurface::new();
        let rig = RecordingRig::new();
        let audio = CountingAudio::new();
        let particles = CountingParticles::new();
        let mut feedback = applier(&surface)
            .with_rig(Box::new(rig.clone()))
            .with_audio(Box::new(audio.clone()))
            .with_particles(Box::new(particles.clone()));

        feedback.on_toggled(ToggleState::Activated);
        feedback.on_toggled(ToggleState::Idle);

        assert_eq!(rig.pulse_count(), 2);
        assert_eq!(rig.last_pulse().as_deref(), Some("Triggered"));
        assert_eq!(audio.count(), 2);
        assert_eq!(particles.count(), 2);
    }

    #[test]
    fn missing_optional_collaborators_degrade_silently() {
        let surface = RecordingSurface::new();
        let mut feedback = applier(&surface);

        feedback.validate(atrium_protocol::EntityId(7));
        feedback.on_toggled(ToggleState::Activated);

        assert_eq!(surface.color("base_color"), Some([0.0, 1.0, 0.0, 1.0]));
    }
}
