//! Simulation tuning.
//!
//! [`SimulationConfig`] is a plain serde struct so the host can embed it in
//! its own TOML file (the game keeps it under `[simulation]`). Every field has
//! a default, so a partial table is enough.

use std::path::PathBuf;

use bevy::prelude::*;
use serde::Deserialize;

/// How the launch force of a freshly spawned drop is computed.
///
/// The classic tuning divides the force by the tick delta, so the raw
/// magnitude depends on the tick length. It stays the default.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LaunchForceMode {
  /// `force = mass * strength / dt`, applied as a force for one step.
  #[default]
  PerTickDelta,
  /// `impulse = mass * strength`, independent of the tick length.
  Impulse,
}

/// Parameters of the pairwise liquid force.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LiquidParams {
  /// Pairs farther apart than this do not interact.
  pub radius: f32,
  /// Distance at which the spring force is zero.
  pub rest_distance: f32,
  /// Spring constant. Attracts beyond `rest_distance`, repels inside it.
  pub stiffness: f32,
  /// Damping of the relative velocity along the pair axis.
  pub viscosity: f32,
  /// Upper bound on the force one pair can exert.
  pub max_pair_force: f32,
}

impl Default for LiquidParams {
  fn default() -> Self {
    Self {
      radius: 12.0,
      rest_distance: 6.0,
      stiffness: 30.0,
      viscosity: 2.0,
      max_pair_force: 400.0,
    }
  }
}

impl LiquidParams {
  /// Reduced variant used in light mode.
  pub fn light() -> Self {
    Self {
      radius: 10.0,
      rest_distance: 6.0,
      stiffness: 24.0,
      viscosity: 1.5,
      max_pair_force: 400.0,
    }
  }
}

/// Core simulation settings.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
  /// Population cap for live drops.
  pub drops_max: usize,
  /// Reduced mode: longer spawn cooldown and the light liquid parameters.
  pub light_mode: bool,
  /// Seconds between spawns in full mode.
  pub spawn_cooldown_full: f32,
  /// Seconds between spawns in light mode.
  pub spawn_cooldown_light: f32,
  /// Drop collider radius in world units.
  pub drop_radius: f32,
  /// Drop mass, fixed so the launch force is known before the body exists.
  pub drop_mass: f32,
  /// Launch strength for cloud drops (applied downwards).
  pub cloud_launch: f32,
  /// Launch strength for emitter drops (applied along +x).
  pub emitter_launch: f32,
  pub launch_force_mode: LaunchForceMode,
  /// Speed given to a source while a directional intent is held.
  pub source_speed: f32,
  /// Half-open jitter range `[-paint_jitter, 0)` for painted drops.
  pub paint_jitter: i32,
  /// Downward gravity in world units per second squared.
  pub gravity: f32,
  /// World units per physics meter.
  pub pixels_per_meter: f32,
  /// Fixed tick rate.
  pub fixed_hz: f64,
  /// Seed of the spawn jitter generator.
  pub seed: u64,
  pub liquid: LiquidParams,
  pub liquid_light: LiquidParams,
  /// Directory holding `main.rhai`, `test.rhai` and the level scripts.
  pub scripts_dir: PathBuf,
  /// Level loaded when the game starts.
  pub start_level: String,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      drops_max: 1000,
      light_mode: false,
      spawn_cooldown_full: 0.05,
      spawn_cooldown_light: 0.09,
      drop_radius: 3.0,
      drop_mass: 1.0,
      cloud_launch: 20.0,
      emitter_launch: 30.0,
      launch_force_mode: LaunchForceMode::PerTickDelta,
      source_speed: 200.0,
      paint_jitter: 10,
      gravity: 98.0,
      pixels_per_meter: 10.0,
      fixed_hz: 60.0,
      seed: 42,
      liquid: LiquidParams::default(),
      liquid_light: LiquidParams::light(),
      scripts_dir: PathBuf::from("assets/levels"),
      start_level: "level1".to_string(),
    }
  }
}

impl SimulationConfig {
  /// Fixed tick length in seconds.
  pub fn tick_dt(&self) -> f32 {
    (1.0 / self.fixed_hz) as f32
  }

  /// Cooldown between two spawns for the active mode.
  pub fn spawn_cooldown(&self) -> f32 {
    if self.light_mode {
      self.spawn_cooldown_light
    } else {
      self.spawn_cooldown_full
    }
  }

  /// Liquid parameters for the active mode.
  pub fn liquid_params(&self) -> LiquidParams {
    if self.light_mode {
      self.liquid_light
    } else {
      self.liquid
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_table_keeps_defaults() {
    let config: SimulationConfig = toml::from_str(
      r#"
      drops_max = 5
      light_mode = true
      launch_force_mode = "impulse"

      [liquid_light]
      radius = 8.0
      "#,
    )
    .unwrap();

    assert_eq!(config.drops_max, 5);
    assert_eq!(config.launch_force_mode, LaunchForceMode::Impulse);
    assert_eq!(config.spawn_cooldown(), 0.09);
    assert_eq!(config.liquid_params().radius, 8.0);
    assert_eq!(config.liquid_params().stiffness, LiquidParams::default().stiffness);
    assert_eq!(config.start_level, "level1");
  }
}
