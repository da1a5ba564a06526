//! Developer console with level, simulation and recording commands.

pub mod commands;
mod toggle;

use bevy::prelude::*;
use bevy_console::{AddConsoleCommand, ConsoleConfiguration, ConsolePlugin};
use commands::{
  DropsCommand, LevelCommand, NextCommand, RecordCommand, ReplayCommand, RestartCommand,
  ToggleCommand, drops_command, level_command, next_command, record_command, replay_command,
  restart_command, toggle_command,
};

pub struct ConsolePlugins;

impl Plugin for ConsolePlugins {
  fn build(&self, app: &mut App) {
    app
      .add_plugins(ConsolePlugin)
      .insert_resource(ConsoleConfiguration {
        // Opened with `/`, see `toggle`.
        keys: vec![],
        ..default()
      })
      .add_console_command::<LevelCommand, _>(level_command)
      .add_console_command::<RestartCommand, _>(restart_command)
      .add_console_command::<NextCommand, _>(next_command)
      .add_console_command::<ToggleCommand, _>(toggle_command)
      .add_console_command::<DropsCommand, _>(drops_command)
      .add_console_command::<RecordCommand, _>(record_command)
      .add_console_command::<ReplayCommand, _>(replay_command)
      .add_systems(Update, toggle::handle_console_toggle);
  }
}
