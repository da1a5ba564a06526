//! Player intents: the input surface of the simulation.
//!
//! Hosts push raw presses and releases into [`IntentQueue`] whenever they
//! like. At the start of every tick [`apply_intents`] stamps them with the
//! tick number, feeds them to the optional [`IntentRecorder`], and applies
//! them to the sources. An active [`IntentReplay`] replaces live input with a
//! recorded stream, which reproduces a run exactly for the same seed.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::level::SimClock;
use crate::source::{LiquidSource, LiquidSources, SourceDirection};
use crate::spawn::SpawnController;

/// One player input.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
  Left,
  Right,
  Up,
  Down,
  /// Emit from the sources.
  Action,
  /// Pointer drag at a world position. Only meaningful on press.
  Paint { x: f32, y: f32 },
}

/// An intent stamped with the tick it was applied on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IntentEvent {
  pub tick: u64,
  pub pressed: bool,
  pub intent: Intent,
}

/// Live input waiting for the next tick.
#[derive(Resource, Default, Debug)]
pub struct IntentQueue {
  pending: Vec<(Intent, bool)>,
}

impl IntentQueue {
  pub fn press(&mut self, intent: Intent) {
    self.pending.push((intent, true));
  }

  pub fn release(&mut self, intent: Intent) {
    self.pending.push((intent, false));
  }

  pub fn push(&mut self, intent: Intent, pressed: bool) {
    self.pending.push((intent, pressed));
  }

  pub fn is_empty(&self) -> bool {
    self.pending.is_empty()
  }

  /// Queued changes in arrival order.
  pub fn pending(&self) -> &[(Intent, bool)] {
    &self.pending
  }

  pub fn clear(&mut self) {
    self.pending.clear();
  }
}

/// Records applied intents while active.
///
/// Tick numbers restart with every level, so a recording is only replayable
/// from a level start. Loading a level restarts an active recording.
#[derive(Resource, Default, Debug)]
pub struct IntentRecorder {
  active: bool,
  level: String,
  seed: u64,
  events: Vec<IntentEvent>,
}

impl IntentRecorder {
  /// Starts a fresh recording.
  pub fn start(&mut self) {
    self.active = true;
    self.events.clear();
  }

  pub fn stop(&mut self) {
    self.active = false;
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn events(&self) -> &[IntentEvent] {
    &self.events
  }

  /// Called on level load with the level's name and spawn seed.
  pub fn begin_level(&mut self, level: &str, seed: u64) {
    self.level = level.to_string();
    self.seed = seed;
    if self.active {
      self.events.clear();
    }
  }

  /// Snapshot of what was recorded so far.
  pub fn recording(&self) -> IntentRecording {
    IntentRecording {
      level: self.level.clone(),
      seed: self.seed,
      events: self.events.clone(),
    }
  }

  fn record(&mut self, event: IntentEvent) {
    if self.active {
      self.events.push(event);
    }
  }
}

/// A recorded intent stream plus what is needed to replay it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct IntentRecording {
  pub level: String,
  pub seed: u64,
  pub events: Vec<IntentEvent>,
}

/// Failure reading or writing a recording.
#[derive(Debug)]
pub enum RecordingError {
  Io(std::io::Error),
  Parse(toml::de::Error),
  Serialize(toml::ser::Error),
}

impl fmt::Display for RecordingError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "recording I/O error: {e}"),
      Self::Parse(e) => write!(f, "recording parse error: {e}"),
      Self::Serialize(e) => write!(f, "recording serialize error: {e}"),
    }
  }
}

impl std::error::Error for RecordingError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Parse(e) => Some(e),
      Self::Serialize(e) => Some(e),
    }
  }
}

impl From<std::io::Error> for RecordingError {
  fn from(e: std::io::Error) -> Self {
    Self::Io(e)
  }
}

impl IntentRecording {
  pub fn to_toml(&self) -> Result<String, RecordingError> {
    toml::to_string(self).map_err(RecordingError::Serialize)
  }

  pub fn from_toml(text: &str) -> Result<Self, RecordingError> {
    toml::from_str(text).map_err(RecordingError::Parse)
  }

  pub fn save(&self, path: &Path) -> Result<(), RecordingError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, self.to_toml()?)?;
    Ok(())
  }

  pub fn load(path: &Path) -> Result<Self, RecordingError> {
    Self::from_toml(&std::fs::read_to_string(path)?)
  }
}

/// Recorded events fed back tick by tick. Live input is ignored while
/// events remain.
#[derive(Resource, Default, Debug)]
pub struct IntentReplay {
  events: VecDeque<IntentEvent>,
}

impl IntentReplay {
  pub fn start(&mut self, events: impl IntoIterator<Item = IntentEvent>) {
    self.events = events.into_iter().collect();
  }

  pub fn is_active(&self) -> bool {
    !self.events.is_empty()
  }

  pub fn clear(&mut self) {
    self.events.clear();
  }

  /// Pops every event stamped at or before `tick`.
  fn due(&mut self, tick: u64) -> Vec<IntentEvent> {
    let mut due = Vec::new();
    while self.events.front().is_some_and(|e| e.tick <= tick) {
      due.extend(self.events.pop_front());
    }
    due
  }
}

/// Applies this tick's intents to the sources and the spawn controller.
#[allow(clippy::too_many_arguments)]
pub fn apply_intents(
  clock: Res<SimClock>,
  config: Res<SimulationConfig>,
  sources: Res<LiquidSources>,
  mut queue: ResMut<IntentQueue>,
  mut replay: ResMut<IntentReplay>,
  mut recorder: ResMut<IntentRecorder>,
  mut controller: ResMut<SpawnController>,
  mut bodies: Query<(&mut Velocity, &mut LiquidSource)>,
) {
  let events: Vec<IntentEvent> = if replay.is_active() {
    queue.clear();
    replay.due(clock.tick)
  } else {
    queue
      .pending
      .drain(..)
      .map(|(intent, pressed)| IntentEvent {
        tick: clock.tick,
        pressed,
        intent,
      })
      .collect()
  };

  for event in events {
    recorder.record(event);
    apply_intent(
      event,
      config.source_speed,
      &sources,
      &mut controller,
      &mut bodies,
    );
  }
}

fn apply_intent(
  event: IntentEvent,
  speed: f32,
  sources: &LiquidSources,
  controller: &mut SpawnController,
  bodies: &mut Query<(&mut Velocity, &mut LiquidSource)>,
) {
  let pressed = event.pressed;

  match event.intent {
    Intent::Left | Intent::Right => {
      let Some(cloud) = sources.cloud else {
        return;
      };
      let Ok((mut velocity, mut source)) = bodies.get_mut(cloud) else {
        return;
      };
      let (sign, direction) = if event.intent == Intent::Left {
        (-1.0, SourceDirection::Left)
      } else {
        (1.0, SourceDirection::Right)
      };
      if pressed {
        velocity.linvel = Vec2::new(sign * speed, 0.0);
        source.direction = direction;
      } else {
        velocity.linvel = Vec2::ZERO;
        source.direction = SourceDirection::Idle;
      }
    }
    Intent::Up | Intent::Down => {
      let Some(emitter) = sources.emitter else {
        return;
      };
      let Ok((mut velocity, _)) = bodies.get_mut(emitter) else {
        return;
      };
      let sign = if event.intent == Intent::Up { 1.0 } else { -1.0 };
      velocity.linvel = if pressed {
        Vec2::new(0.0, sign * speed)
      } else {
        Vec2::ZERO
      };
    }
    Intent::Action => {
      controller.emitting = pressed;
      let Some(cloud) = sources.cloud else {
        return;
      };
      if let Ok((_, mut source)) = bodies.get_mut(cloud) {
        source.direction = if pressed {
          SourceDirection::Raining
        } else {
          SourceDirection::Idle
        };
      }
    }
    Intent::Paint { x, y } => {
      if pressed {
        controller.paint_requests.push(Vec2::new(x, y));
      }
    }
  }
}
