//! Level scripting.
//!
//! A level is described by Rhai code: the shared `main.rhai` followed by the
//! level's own file. The engine calls four optional callbacks:
//!
//! | callback                  | when                                  |
//! |---------------------------|---------------------------------------|
//! | `onCreate(world)`         | once, after the level was torn down   |
//! | `onCheck(drops)`          | every tick, after spawning            |
//! | `onBeginContact(a, b)`    | when two actors start touching        |
//! | `onEndContact(a, b)`      | when they stop                        |
//!
//! Scripts never touch engine state directly. `onCreate` queues actor specs
//! through the `world` handle, and every other callback only sees read-only
//! views.

mod api;
mod host;
mod store;

use std::fmt;
use std::path::PathBuf;

pub use api::{ActorView, DropView, ScriptWorld};
pub use host::{Callback, ScriptCallbackSet, ScriptHost, load_level};
pub use store::{FileScriptStore, LevelScripts, MemoryScriptStore, ScriptStore, ScriptStoreRes};

/// Failure loading or running a level script.
#[derive(Debug)]
pub enum ScriptError {
  /// Script file does not exist.
  Missing { path: PathBuf },
  /// Script file exists but could not be read.
  Io(std::io::Error),
  /// Script did not compile.
  Compile(String),
  /// Script raised an error while running.
  Runtime(String),
}

impl fmt::Display for ScriptError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Missing { path } => write!(f, "script not found: {}", path.display()),
      Self::Io(e) => write!(f, "script I/O error: {e}"),
      Self::Compile(msg) => write!(f, "script compile error: {msg}"),
      Self::Runtime(msg) => write!(f, "script runtime error: {msg}"),
    }
  }
}

impl std::error::Error for ScriptError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<std::io::Error> for ScriptError {
  fn from(err: std::io::Error) -> Self {
    Self::Io(err)
  }
}
