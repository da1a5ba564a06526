//! Level loading commands.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_console::{ConsoleCommand, reply};
use bevy_rain::{LevelId, LevelState, LoadLevel};
use clap::Parser;

#[derive(Parser, ConsoleCommand)]
#[command(name = "level")]
pub struct LevelCommand {
  /// Level script name without extension (e.g. "level2")
  name: String,
}

pub fn level_command(mut log: ConsoleCommand<LevelCommand>, mut loads: MessageWriter<LoadLevel>) {
  if let Some(Ok(LevelCommand { name })) = log.take() {
    reply!(log, "Loading {}", name);
    loads.write(LoadLevel::named(name));
  }
}

/// Reloads the current level from scratch.
#[derive(Parser, ConsoleCommand)]
#[command(name = "restart")]
pub struct RestartCommand;

pub fn restart_command(
  mut log: ConsoleCommand<RestartCommand>,
  level: Res<LevelId>,
  mut loads: MessageWriter<LoadLevel>,
) {
  if let Some(Ok(RestartCommand)) = log.take() {
    if level.name.is_empty() {
      reply!(log, "No level loaded");
      return;
    }
    reply!(log, "Restarting {}", level.name);
    loads.write(LoadLevel::named(level.name.clone()));
  }
}

/// Loads the level after the current one.
#[derive(Parser, ConsoleCommand)]
#[command(name = "next")]
pub struct NextCommand {
  /// Skip ahead even if the level is not won
  #[arg(short = 'f', long = "force")]
  force: bool,
}

pub fn next_command(
  mut log: ConsoleCommand<NextCommand>,
  level: Res<LevelId>,
  state: Res<LevelState>,
  mut loads: MessageWriter<LoadLevel>,
) {
  if let Some(Ok(NextCommand { force })) = log.take() {
    if *state != LevelState::Won && !force {
      reply!(log, "Level not won yet, use --force to skip");
      return;
    }
    let next = level.next();
    reply!(log, "Loading {}", next);
    loads.write(LoadLevel::named(next));
  }
}
