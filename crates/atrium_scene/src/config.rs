//! Scene-authoring configuration.
//!
//! A scene is authored once and loaded at session start; everything here is
//! immutable for the rest of the session. The file format is RON, matching
//! how the rest of the project stores authored data.

use std::{collections::HashSet, fs, path::Path, time::Duration};

use atrium_protocol::EntityId;
use serde::{Deserialize, Serialize};

use crate::engine::Rgba;

/// Root of one scene's authored constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    pub interactables: Vec<InteractableConfig>,
    /// Fixed physics tick rate the driver runs at, in Hz.
    #[serde(default = "default_physics_hz")]
    pub physics_hz: f64,
}

impl SceneConfig {
    /// Reads and validates a scene config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Parses and validates a scene config from RON text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.physics_hz.is_finite() && self.physics_hz > 0.0) {
            return Err(ConfigError::InvalidTickRate(self.physics_hz));
        }
        let mut seen = HashSet::new();
        for interactable in &self.interactables {
            let id = interactable.entity_id();
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateEntity(id));
            }
            if !(interactable.cooldown_secs.is_finite() && interactable.cooldown_secs >= 0.0) {
                return Err(ConfigError::InvalidCooldown(id));
            }
        }
        Ok(())
    }
}

/// Movement constants for the local player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Movement speed in units per second.
    pub move_speed: f32,
    /// Upward impulse applied on an admitted jump.
    pub jump_force: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 10.0,
        }
    }
}

/// Whether an entity's toggles stay on this peer or replicate to the session.
///
/// Selected per entity at construction; there is no runtime switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReplicationMode {
    /// Toggles apply locally and nothing is broadcast.
    LocalOnly,
    /// Admitted toggles broadcast a flip signal to every peer.
    #[default]
    Networked,
}

/// Authored constants for one interactable object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractableConfig {
    pub id: u32,
    /// Trigger-volume tag of the detection zone around this object.
    pub zone_tag: String,
    /// Prompt text shown while the local peer is inside the zone.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Minimum local time between two admitted attempts, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f32,
    #[serde(default)]
    pub replication: ReplicationMode,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl InteractableConfig {
    pub fn entity_id(&self) -> EntityId {
        EntityId(self.id)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs)
    }
}

/// Styling of the visual projection of an entity's toggle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Render-state override key written on every toggle application.
    #[serde(default = "default_override_key")]
    pub override_key: String,
    #[serde(default = "default_idle_color")]
    pub idle_color: Rgba,
    #[serde(default = "default_activated_color")]
    pub activated_color: Rgba,
    /// Animation trigger fired on every flip.
    #[serde(default = "default_pulse_trigger")]
    pub pulse_trigger: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            override_key: default_override_key(),
            idle_color: default_idle_color(),
            activated_color: default_activated_color(),
            pulse_trigger: default_pulse_trigger(),
        }
    }
}

fn default_physics_hz() -> f64 {
    50.0
}

fn default_prompt() -> String {
    "Press to interact".into()
}

fn default_cooldown_secs() -> f32 {
    1.0
}

fn default_override_key() -> String {
    "base_color".into()
}

fn default_idle_color() -> Rgba {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_activated_color() -> Rgba {
    [0.0, 1.0, 0.0, 1.0]
}

fn default_pulse_trigger() -> String {
    "Triggered".into()
}

/// Error produced while loading or validating a scene config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read scene config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("duplicate interactable id {0}")]
    DuplicateEntity(EntityId),
    #[error("{0} has a negative or non-finite cooldown")]
    InvalidCooldown(EntityId),
    #[error("physics_hz must be positive and finite, got {0}")]
    InvalidTickRate(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"(
        interactables: [
            (id: 1, zone_tag: "lever_zone"),
        ],
    )"#;

    #[test]
    fn minimal_scene_fills_defaults() {
        let config = SceneConfig::from_str(MINIMAL).unwrap();
        assert_eq!(config.player.move_speed, 5.0);
        assert_eq!(config.physics_hz, 50.0);

        let lever = &config.interactables[0];
        assert_eq!(lever.entity_id(), EntityId(1));
        assert_eq!(lever.cooldown(), Duration::from_secs(1));
        assert_eq!(lever.replication, ReplicationMode::Networked);
        assert_eq!(lever.feedback.idle_color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn duplicate_entity_ids_are_rejected() {
        let text = r#"(
            interactables: [
                (id: 1, zone_tag: "a"),
                (id: 1, zone_tag: "b"),
            ],
        )"#;
        assert!(matches!(
            SceneConfig::from_str(text),
            Err(ConfigError::DuplicateEntity(EntityId(1)))
        ));
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let text = r#"(
            interactables: [
                (id: 1, zone_tag: "a", cooldown_secs: -0.5),
            ],
        )"#;
        assert!(matches!(
            SceneConfig::from_str(text),
            Err(ConfigError::InvalidCooldown(EntityId(1)))
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.interactables.len(), 1);
    }
}
