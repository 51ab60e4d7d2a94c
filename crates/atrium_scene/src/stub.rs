//! In-memory collaborator implementations.
//!
//! Used by the headless demo driver and by tests. Each type keeps its
//! observable state behind a shared handle, so the host can clone one before
//! boxing it into the scene and inspect afterwards what the scene did.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use atrium_net::{BroadcastScope, BroadcastTransport};
use atrium_protocol::{ChannelId, EntityId};
use bytes::Bytes;
use glam::Vec3;

use crate::engine::{
    AnimationRig, AudioEmitter, ParticleEmitter, PhysicsBody, PromptUi, RenderSurface, Rgba,
};

/// Render surface recording overrides into a shared map.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    overrides: Arc<Mutex<HashMap<String, Rgba>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self, key: &str) -> Option<Rgba> {
        self.overrides.lock().unwrap().get(key).copied()
    }
}

impl RenderSurface for RecordingSurface {
    fn set_override(&mut self, key: &str, color: Rgba) {
        self.overrides.lock().unwrap().insert(key.to_owned(), color);
    }

    fn override_color(&self, key: &str) -> Option<Rgba> {
        self.overrides.lock().unwrap().get(key).copied()
    }
}

#[derive(Debug, Default)]
struct RigState {
    pulses: Vec<String>,
    bools: HashMap<String, bool>,
    floats: HashMap<String, f32>,
}

/// Animation rig recording every trigger and parameter write.
#[derive(Debug, Clone, Default)]
pub struct RecordingRig {
    state: Arc<Mutex<RigState>>,
}

impl RecordingRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulse_count(&self) -> usize {
        self.state.lock().unwrap().pulses.len()
    }

    pub fn last_pulse(&self) -> Option<String> {
        self.state.lock().unwrap().pulses.last().cloned()
    }

    pub fn bool_param(&self, name: &str) -> Option<bool> {
        self.state.lock().unwrap().bools.get(name).copied()
    }

    pub fn float_param(&self, name: &str) -> Option<f32> {
        self.state.lock().unwrap().floats.get(name).copied()
    }
}

impl AnimationRig for RecordingRig {
    fn pulse(&mut self, trigger: &str) {
        self.state.lock().unwrap().pulses.push(trigger.to_owned());
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.state.lock().unwrap().bools.insert(name.to_owned(), value);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.state.lock().unwrap().floats.insert(name.to_owned(), value);
    }
}

/// Audio emitter counting one-shot plays.
#[derive(Debug, Clone, Default)]
pub struct CountingAudio {
    plays: Arc<Mutex<usize>>,
}

impl CountingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        *self.plays.lock().unwrap()
    }
}

impl AudioEmitter for CountingAudio {
    fn play_one_shot(&mut self) {
        *self.plays.lock().unwrap() += 1;
    }
}

/// Particle emitter counting bursts.
#[derive(Debug, Clone, Default)]
pub struct CountingParticles {
    bursts: Arc<Mutex<usize>>,
}

impl CountingParticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        *self.bursts.lock().unwrap()
    }
}

impl ParticleEmitter for CountingParticles {
    fn burst(&mut self) {
        *self.bursts.lock().unwrap() += 1;
    }
}

/// Prompt UI tracking which prompts are currently visible.
#[derive(Debug, Clone, Default)]
pub struct RecordingPrompts {
    visible: Arc<Mutex<HashMap<EntityId, String>>>,
}

impl RecordingPrompts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt_for(&self, entity: EntityId) -> Option<String> {
        self.visible.lock().unwrap().get(&entity).cloned()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.lock().unwrap().len()
    }
}

impl PromptUi for RecordingPrompts {
    fn show_prompt(&mut self, entity: EntityId, text: &str) {
        self.visible.lock().unwrap().insert(entity, text.to_owned());
    }

    fn hide_prompt(&mut self, entity: EntityId) {
        self.visible.lock().unwrap().remove(&entity);
    }
}

#[derive(Debug, Default)]
struct BodyState {
    position: Vec3,
    impulses: Vec<Vec3>,
}

/// Body that teleports on `move_to` and records impulses instead of
/// simulating them. Enough physics for a headless session.
#[derive(Debug, Clone, Default)]
pub struct KinematicBody {
    state: Arc<Mutex<BodyState>>,
}

impl KinematicBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: Vec3) -> Self {
        let body = Self::default();
        body.state.lock().unwrap().position = position;
        body
    }

    pub fn impulse_count(&self) -> usize {
        self.state.lock().unwrap().impulses.len()
    }

    pub fn last_impulse(&self) -> Option<Vec3> {
        self.state.lock().unwrap().impulses.last().copied()
    }
}

impl PhysicsBody for KinematicBody {
    fn position(&self) -> Vec3 {
        self.state.lock().unwrap().position
    }

    fn move_to(&mut self, target: Vec3) {
        self.state.lock().unwrap().position = target;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.state.lock().unwrap().impulses.push(impulse);
    }
}

/// Recorded broadcast kept by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct SentBroadcast {
    pub scope: BroadcastScope,
    pub channel: ChannelId,
    pub payload: Bytes,
}

/// Transport that records outbound broadcasts instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentBroadcast>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentBroadcast> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl BroadcastTransport for RecordingTransport {
    fn broadcast(&self, scope: BroadcastScope, channel: ChannelId, payload: Bytes) {
        self.sent.lock().unwrap().push(SentBroadcast {
            scope,
            channel,
            payload,
        });
    }
}
