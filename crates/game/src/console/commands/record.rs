//! Intent recording and replay.

use std::path::PathBuf;

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_console::{ConsoleCommand, reply};
use bevy_rain::{IntentRecorder, IntentRecording, LoadLevel};
use clap::{Parser, Subcommand};

#[derive(Subcommand)]
pub enum RecordAction {
  /// Start recording; the level restarts so ticks count from its start
  Start,
  /// Stop recording, keeping the events
  Stop,
  /// Write the recording as TOML
  Save { path: PathBuf },
}

#[derive(Parser, ConsoleCommand)]
#[command(name = "record")]
pub struct RecordCommand {
  #[command(subcommand)]
  action: RecordAction,
}

pub fn record_command(
  mut log: ConsoleCommand<RecordCommand>,
  mut recorder: ResMut<IntentRecorder>,
  level: Res<bevy_rain::LevelId>,
  mut loads: MessageWriter<LoadLevel>,
) {
  let Some(Ok(RecordCommand { action })) = log.take() else {
    return;
  };
  match action {
    RecordAction::Start => {
      if level.name.is_empty() {
        reply!(log, "No level loaded");
        return;
      }
      recorder.start();
      loads.write(LoadLevel::named(level.name.clone()));
      reply!(log, "Recording {} from its start", level.name);
    }
    RecordAction::Stop => {
      recorder.stop();
      reply!(log, "Recording stopped, {} intents", recorder.events().len());
    }
    RecordAction::Save { path } => match recorder.recording().save(&path) {
      Ok(()) => reply!(log, "Saved {} intents to {}", recorder.events().len(), path.display()),
      Err(err) => reply!(log, "Save failed: {}", err),
    },
  }
}

#[derive(Parser, ConsoleCommand)]
#[command(name = "replay")]
pub struct ReplayCommand {
  /// Recording written by `record save`
  path: PathBuf,
}

pub fn replay_command(mut log: ConsoleCommand<ReplayCommand>, mut loads: MessageWriter<LoadLevel>) {
  if let Some(Ok(ReplayCommand { path })) = log.take() {
    match IntentRecording::load(&path) {
      Ok(recording) => {
        reply!(
          log,
          "Replaying {} intents on {} (seed {})",
          recording.events.len(),
          recording.level,
          recording.seed
        );
        loads.write(LoadLevel::replaying(&recording));
      }
      Err(err) => reply!(log, "Cannot replay {}: {}", path.display(), err),
    }
  }
}
