//! Drop spawning from the cloud, the emitter and the pointer.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::actor::{Actor, ActorKind, ActorSpawner};
use crate::config::{LaunchForceMode, SimulationConfig};
use crate::level::{LevelOutcome, SimClock};
use crate::physics::PendingForce;
use crate::source::LiquidSource;

/// Spawn bookkeeping for the current level.
#[derive(Resource, Default, Debug)]
pub struct SpawnController {
  /// Emit button held.
  pub emitting: bool,
  /// Sim time of the last source spawn. Shared by cloud and emitter.
  pub last_spawn: Option<f64>,
  /// Pointer positions queued by paint intents this tick.
  pub paint_requests: Vec<Vec2>,
}

impl SpawnController {
  /// True once more than `cooldown` seconds passed since the last spawn.
  pub fn ready(&self, now: f64, cooldown: f64) -> bool {
    self.last_spawn.is_none_or(|last| now - last > cooldown)
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

/// The only randomness of the simulation.
#[derive(Resource)]
pub struct SpawnRng(pub StdRng);

impl SpawnRng {
  pub fn seeded(seed: u64) -> Self {
    Self(StdRng::seed_from_u64(seed))
  }

  pub fn reseed(&mut self, seed: u64) {
    self.0 = StdRng::seed_from_u64(seed);
  }
}

/// Horizontal spawn position inside the middle third of a source.
pub fn jittered_x(source_x: f32, width: f32, unit: f32) -> f32 {
  source_x - width / 3.0 + unit * width * 2.0 / 3.0
}

/// Launch force for a new drop pushed along `direction` with `strength`.
pub fn launch_force(config: &SimulationConfig, direction: Vec2, strength: f32) -> PendingForce {
  let push = direction * config.drop_mass * strength;
  match config.launch_force_mode {
    LaunchForceMode::PerTickDelta => PendingForce::force(push / config.tick_dt()),
    LaunchForceMode::Impulse => PendingForce::impulse(push),
  }
}

/// Spawns at most one drop per source, cloud first.
pub fn spawn_from_sources(
  mut spawner: ActorSpawner,
  mut controller: ResMut<SpawnController>,
  mut rng: ResMut<SpawnRng>,
  outcome: Res<LevelOutcome>,
  clock: Res<SimClock>,
  sources: Query<(&Transform, &Actor), With<LiquidSource>>,
) {
  if !controller.emitting || outcome.won {
    return;
  }

  let config = spawner.config().clone();
  let cooldown = f64::from(config.spawn_cooldown());
  let slots = [spawner.sources().cloud, spawner.sources().emitter];

  for entity in slots.into_iter().flatten() {
    if !controller.ready(clock.elapsed, cooldown) || spawner.drop_count() >= config.drops_max {
      continue;
    }
    let Ok((transform, actor)) = sources.get(entity) else {
      continue;
    };

    let width = actor.kind.width(config.drop_radius);
    let x = jittered_x(transform.translation.x, width, rng.0.random::<f32>());
    let position = Vec2::new(x, transform.translation.y);
    let launch = if matches!(actor.kind, ActorKind::Emitter { .. }) {
      launch_force(&config, Vec2::X, config.emitter_launch)
    } else {
      launch_force(&config, Vec2::NEG_Y, config.cloud_launch)
    };

    spawner.spawn_drop(position, launch);
    controller.last_spawn = Some(clock.elapsed);
  }
}

/// Turns queued paint requests into drops when the level has no source.
pub fn spawn_painted(
  mut spawner: ActorSpawner,
  mut controller: ResMut<SpawnController>,
  mut rng: ResMut<SpawnRng>,
  outcome: Res<LevelOutcome>,
) {
  let requests = std::mem::take(&mut controller.paint_requests);
  if requests.is_empty() || outcome.won || !spawner.sources().is_empty() {
    return;
  }

  let jitter = spawner.config().paint_jitter.max(1);
  let drops_max = spawner.config().drops_max;
  for pointer in requests {
    if spawner.drop_count() >= drops_max {
      break;
    }
    let offset = IVec2::new(
      rng.0.random_range(-jitter..0),
      rng.0.random_range(-jitter..0),
    );
    spawner.spawn_drop(pointer + offset.as_vec2(), PendingForce::default());
  }
}
