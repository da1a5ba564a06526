//! Level lifecycle: loading, the per-tick clock and the win latch.
//!
//! A level goes `Loading → Playing → Won`. Loading is triggered by a
//! [`LoadLevel`] message and completes within the same `PreUpdate` pass:
//! the previous level is torn down, the scripts are loaded (degrading on
//! failure), `onCreate` populates the world and the level starts playing.
//! `Won` is a one-way latch. Drops keep simulating, only spawning stops.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

use crate::actor::{Actor, ActorIds, ActorSpawner};
use crate::config::SimulationConfig;
use crate::drops::DropStore;
use crate::intent::{IntentEvent, IntentQueue, IntentRecorder, IntentRecording, IntentReplay};
use crate::physics::SimulationToggles;
use crate::script::{DropView, ScriptHost, ScriptStoreRes, load_level};
use crate::source::LiquidSources;
use crate::spawn::{SpawnController, SpawnRng};

/// Where the level is in its lifecycle.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelState {
  #[default]
  Loading,
  Playing,
  Won,
}

/// Run condition: the simulation ticks.
pub fn level_running(state: Res<LevelState>) -> bool {
  matches!(*state, LevelState::Playing | LevelState::Won)
}

/// Name of the current level and the number parsed from its digits.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelId {
  pub name: String,
  pub number: u32,
}

impl LevelId {
  /// `"level12"` is number 12. A name without digits is number 0.
  pub fn parse(name: &str) -> Self {
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    Self {
      name: name.to_string(),
      number: digits.parse().unwrap_or(0),
    }
  }

  /// The level after this one.
  pub fn next(&self) -> String {
    format!("level{}", self.number.saturating_add(1))
  }
}

/// What the level script decided so far.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct LevelOutcome {
  pub won: bool,
  pub won_at_tick: Option<u64>,
  /// Hint the script set in `onCreate`.
  pub hint: Option<String>,
  /// Failed `onCheck` calls this level.
  pub check_errors: u32,
}

/// Simulation time of the current level.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
  /// Ticks run so far. The first tick is 1.
  pub tick: u64,
  /// Seconds simulated so far.
  pub elapsed: f64,
}

/// Request to (re)load a level.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct LoadLevel {
  pub name: String,
  /// Spawn seed, `None` for the configured one.
  pub seed: Option<u64>,
  /// Intents replayed instead of live input.
  pub replay: Vec<IntentEvent>,
}

impl LoadLevel {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      seed: None,
      replay: Vec::new(),
    }
  }

  /// Reloads the recorded level with its seed and replays its intents.
  pub fn replaying(recording: &IntentRecording) -> Self {
    Self {
      name: recording.level.clone(),
      seed: Some(recording.seed),
      replay: recording.events.clone(),
    }
  }
}

/// Written once when a level is won.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct LevelWon {
  pub level: String,
  pub tick: u64,
}

/// Load accepted by teardown, waiting for the script.
#[derive(Resource, Default, Debug)]
pub struct PendingLoad(Option<LoadLevel>);

/// Everything a level owns.
#[derive(SystemParam)]
pub struct LevelReset<'w, 's> {
  commands: Commands<'w, 's>,
  actors: Query<'w, 's, Entity, With<Actor>>,
  drops: ResMut<'w, DropStore>,
  sources: ResMut<'w, LiquidSources>,
  ids: ResMut<'w, ActorIds>,
  clock: ResMut<'w, SimClock>,
  controller: ResMut<'w, SpawnController>,
  rng: ResMut<'w, SpawnRng>,
  toggles: ResMut<'w, SimulationToggles>,
  queue: ResMut<'w, IntentQueue>,
  replay: ResMut<'w, IntentReplay>,
  recorder: ResMut<'w, IntentRecorder>,
  outcome: ResMut<'w, LevelOutcome>,
  state: ResMut<'w, LevelState>,
}

impl LevelReset<'_, '_> {
  fn tear_down(&mut self, name: &str, seed: u64) {
    let mut despawned = 0usize;
    for entity in &self.actors {
      self.commands.entity(entity).despawn();
      despawned += 1;
    }
    self.drops.drain();
    self.sources.clear();
    self.ids.reset();
    *self.clock = SimClock::default();
    self.controller.reset();
    self.rng.reseed(seed);
    *self.toggles = SimulationToggles::default();
    self.queue.clear();
    self.replay.clear();
    self.recorder.begin_level(name, seed);
    *self.outcome = LevelOutcome::default();
    *self.state = LevelState::Loading;
    debug!("Tore down level, {despawned} actors despawned");
  }
}

/// Tears the current level down when a load is requested. The last request
/// of a frame wins.
pub fn handle_load_requests(
  mut requests: MessageReader<LoadLevel>,
  mut reset: LevelReset,
  mut pending: ResMut<PendingLoad>,
  mut level: ResMut<LevelId>,
  config: Res<SimulationConfig>,
) {
  let Some(request) = requests.read().last().cloned() else {
    return;
  };
  info!("Loading level {}", request.name);
  reset.tear_down(&request.name, request.seed.unwrap_or(config.seed));
  *level = LevelId::parse(&request.name);
  pending.0 = Some(request);
}

/// Loads the scripts of a pending level, enters `Playing` and runs
/// `onCreate`. Drops past `drops_max` are refused.
pub fn finish_loading(
  mut pending: ResMut<PendingLoad>,
  store: Res<ScriptStoreRes>,
  mut host: ResMut<ScriptHost>,
  mut spawner: ActorSpawner,
  mut state: ResMut<LevelState>,
  mut outcome: ResMut<LevelOutcome>,
  mut replay: ResMut<IntentReplay>,
) {
  let Some(load) = pending.0.take() else {
    return;
  };

  *host = load_level(store.0.as_ref(), &load.name, spawner.config().drops_max);
  *state = LevelState::Playing;

  if let Err(err) = host.call_create() {
    error!("Level {}: {err}", load.name);
  }
  let drops_max = spawner.config().drops_max;
  let mut spawned = 0usize;
  let mut refused = 0usize;
  for spec in host.take_specs() {
    if spec.kind.is_drop() && spawner.drop_count() >= drops_max {
      refused += 1;
      continue;
    }
    spawner.spawn(&spec);
    spawned += 1;
  }
  if refused > 0 {
    warn!("Level {}: {refused} drops refused, cap is {drops_max}", load.name);
  }
  outcome.hint = host.hint();

  if !load.replay.is_empty() {
    info!("Replaying {} intents", load.replay.len());
    replay.start(load.replay);
  }
  info!("Level {} playing with {spawned} actors", load.name);
}

/// Advances the level clock by one fixed step.
pub fn advance_clock(mut clock: ResMut<SimClock>, config: Res<SimulationConfig>) {
  clock.tick += 1;
  clock.elapsed += 1.0 / config.fixed_hz;
}

/// Asks `onCheck` whether the level is won and latches the first "yes".
#[allow(clippy::too_many_arguments)]
pub fn check_outcome(
  mut host: ResMut<ScriptHost>,
  mut state: ResMut<LevelState>,
  mut outcome: ResMut<LevelOutcome>,
  mut won: MessageWriter<LevelWon>,
  clock: Res<SimClock>,
  level: Res<LevelId>,
  store: Res<DropStore>,
  drops: Query<(&Actor, &Transform, &Velocity)>,
) {
  let views: Vec<DropView> = store
    .iter()
    .filter_map(|entity| drops.get(entity).ok())
    .map(|(actor, transform, velocity)| {
      DropView::new(actor, transform.translation.truncate(), velocity.linvel)
    })
    .collect();

  match host.call_check(views) {
    Ok(true) if !outcome.won => {
      outcome.won = true;
      outcome.won_at_tick = Some(clock.tick);
      *state = LevelState::Won;
      info!("Level {} won at tick {}", level.name, clock.tick);
      won.write(LevelWon {
        level: level.name.clone(),
        tick: clock.tick,
      });
    }
    Ok(_) => {}
    Err(err) => {
      outcome.check_errors += 1;
      if outcome.check_errors == 1 {
        error!("Level {}: {err}; further failures are not logged", level.name);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn level_numbers_come_from_digits() {
    let id = LevelId::parse("level3");
    assert_eq!(id.number, 3);
    assert_eq!(id.next(), "level4");

    let test = LevelId::parse("test");
    assert_eq!(test.number, 0);
    assert_eq!(test.next(), "level1");
  }

  #[test]
  fn replaying_load_carries_seed_and_events() {
    let recording = IntentRecording {
      level: "level2".into(),
      seed: 99,
      events: vec![IntentEvent {
        tick: 3,
        pressed: true,
        intent: crate::intent::Intent::Action,
      }],
    };
    let load = LoadLevel::replaying(&recording);
    assert_eq!(load.name, "level2");
    assert_eq!(load.seed, Some(99));
    assert_eq!(load.replay.len(), 1);
  }
}
