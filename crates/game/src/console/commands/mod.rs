//! Console commands.

mod level;
mod record;
mod sim;

pub use level::{
  LevelCommand, NextCommand, RestartCommand, level_command, next_command, restart_command,
};
pub use record::{RecordCommand, ReplayCommand, record_command, replay_command};
pub use sim::{DropsCommand, ToggleCommand, drops_command, toggle_command};
