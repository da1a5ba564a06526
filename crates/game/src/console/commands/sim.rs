//! Simulation switches and stats.

use bevy::prelude::*;
use bevy_console::{ConsoleCommand, reply};
use bevy_rain::{DropStore, SimClock, SimulationConfig, SimulationToggles};
use clap::{Parser, ValueEnum};

use crate::input::on_off;
use crate::visual_debug::DebugDraw;

#[derive(Clone, Copy, ValueEnum)]
pub enum ToggleTarget {
  /// Rigid-body stepping
  Physics,
  /// Pairwise liquid forces
  Liquid,
  /// Collider and velocity overlay
  Debug,
}

#[derive(Parser, ConsoleCommand)]
#[command(name = "toggle")]
pub struct ToggleCommand {
  /// What to toggle
  target: ToggleTarget,
}

pub fn toggle_command(
  mut log: ConsoleCommand<ToggleCommand>,
  mut toggles: ResMut<SimulationToggles>,
  mut debug: ResMut<DebugDraw>,
) {
  if let Some(Ok(ToggleCommand { target })) = log.take() {
    match target {
      ToggleTarget::Physics => {
        toggles.physics = !toggles.physics;
        reply!(log, "Physics: {}", on_off(toggles.physics));
      }
      ToggleTarget::Liquid => {
        toggles.liquid_forces = !toggles.liquid_forces;
        reply!(log, "Liquid forces: {}", on_off(toggles.liquid_forces));
      }
      ToggleTarget::Debug => {
        debug.0 = !debug.0;
        reply!(log, "Debug draw: {}", on_off(debug.0));
      }
    }
  }
}

/// Prints the drop population.
#[derive(Parser, ConsoleCommand)]
#[command(name = "drops")]
pub struct DropsCommand;

pub fn drops_command(
  mut log: ConsoleCommand<DropsCommand>,
  drops: Res<DropStore>,
  config: Res<SimulationConfig>,
  clock: Res<SimClock>,
) {
  if let Some(Ok(DropsCommand)) = log.take() {
    reply!(
      log,
      "{}/{} drops at tick {} ({:.2}s)",
      drops.len(),
      config.drops_max,
      clock.tick,
      clock.elapsed
    );
  }
}
