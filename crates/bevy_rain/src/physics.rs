//! Rapier setup and the per-tick force accumulator.
//!
//! Systems never write Rapier's `ExternalForce` directly. They add to the
//! body's [`PendingForce`], which [`flush_forces`] hands to the backend right
//! before the step and then clears. Forces therefore act for exactly one
//! step, like a force applied to the center of a body in a classic 2D engine.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::SimulationConfig;

/// Force and impulse queued for a body's next physics step.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct PendingForce {
  pub force: Vec2,
  pub impulse: Vec2,
}

impl PendingForce {
  pub fn force(force: Vec2) -> Self {
    Self {
      force,
      impulse: Vec2::ZERO,
    }
  }

  pub fn impulse(impulse: Vec2) -> Self {
    Self {
      force: Vec2::ZERO,
      impulse,
    }
  }

  pub fn add_force(&mut self, force: Vec2) {
    self.force += force;
  }
}

/// Debug switches gating the physics part of a tick.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationToggles {
  /// Rapier integration on/off.
  pub physics: bool,
  /// Liquid constraint solve on/off.
  pub liquid_forces: bool,
}

impl Default for SimulationToggles {
  fn default() -> Self {
    Self {
      physics: true,
      liquid_forces: true,
    }
  }
}

/// Run condition for the liquid solver.
pub fn liquid_forces_enabled(toggles: Res<SimulationToggles>) -> bool {
  toggles.liquid_forces
}

/// Adds Rapier to [`FixedUpdate`] with a fixed timestep.
///
/// Rapier has to share the schedule with the rain sets so that a tick is
/// one ordered pass. A host that already added Rapier elsewhere keeps its
/// own plugin and loses that ordering.
pub struct RainPhysicsPlugin {
  pub pixels_per_meter: f32,
  pub fixed_hz: f64,
}

impl Plugin for RainPhysicsPlugin {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<RapierPhysicsPlugin<NoUserData>>() {
      app.add_plugins(
        RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(self.pixels_per_meter)
          .in_schedule(FixedUpdate),
      );
    }

    app
      .insert_resource(Time::<Fixed>::from_hz(self.fixed_hz))
      .insert_resource(TimestepMode::Fixed {
        dt: (1.0 / self.fixed_hz) as f32,
        substeps: 1,
      })
      .init_resource::<SimulationToggles>();
  }
}

/// Keeps gravity and the pipeline switch of every physics context in line
/// with the config and the toggles.
pub fn sync_physics_settings(
  config: Res<SimulationConfig>,
  toggles: Res<SimulationToggles>,
  mut contexts: Query<&mut RapierConfiguration>,
) {
  let gravity = Vec2::new(0.0, -config.gravity);
  for mut rapier in &mut contexts {
    if rapier.gravity != gravity {
      rapier.gravity = gravity;
    }
    if rapier.physics_pipeline_active != toggles.physics {
      rapier.physics_pipeline_active = toggles.physics;
    }
  }
}

/// Moves queued forces into Rapier and clears the queue.
pub fn flush_forces(
  mut bodies: Query<(&mut PendingForce, &mut ExternalForce, &mut ExternalImpulse)>,
) {
  for (mut pending, mut force, mut impulse) in &mut bodies {
    let queued = std::mem::take(&mut *pending);
    if force.force != queued.force || force.torque != 0.0 {
      force.force = queued.force;
      force.torque = 0.0;
    }
    if impulse.impulse != queued.impulse || impulse.torque_impulse != 0.0 {
      impulse.impulse = queued.impulse;
      impulse.torque_impulse = 0.0;
    }
  }
}
