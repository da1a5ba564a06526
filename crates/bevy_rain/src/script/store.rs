//! Where level scripts come from.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use super::ScriptError;

/// Name of the script prepended to every level.
pub const MAIN_SCRIPT: &str = "main";

/// Level loaded when the requested one does not exist.
pub const FALLBACK_LEVEL: &str = "test";

/// Read access to named script sources.
pub trait ScriptStore: Send + Sync {
  /// Returns the source of script `name`, or [`ScriptError::Missing`].
  fn read(&self, name: &str) -> Result<String, ScriptError>;
}

/// Scripts stored as `<dir>/<name>.rhai`.
#[derive(Debug, Clone)]
pub struct FileScriptStore {
  dir: PathBuf,
}

impl FileScriptStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_of(&self, name: &str) -> PathBuf {
    self.dir.join(format!("{name}.rhai"))
  }
}

impl ScriptStore for FileScriptStore {
  fn read(&self, name: &str) -> Result<String, ScriptError> {
    let path = self.path_of(name);
    std::fs::read_to_string(&path).map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => ScriptError::Missing { path },
      _ => ScriptError::Io(e),
    })
  }
}

/// In-memory scripts, for tests and embedded levels.
#[derive(Debug, Clone, Default)]
pub struct MemoryScriptStore {
  scripts: HashMap<String, String>,
}

impl MemoryScriptStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
    self.insert(name, source);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
    self.scripts.insert(name.into(), source.into());
  }
}

impl ScriptStore for MemoryScriptStore {
  fn read(&self, name: &str) -> Result<String, ScriptError> {
    self
      .scripts
      .get(name)
      .cloned()
      .ok_or_else(|| ScriptError::Missing {
        path: PathBuf::from(format!("{name}.rhai")),
      })
  }
}

/// Script store used by level loading.
#[derive(Resource)]
pub struct ScriptStoreRes(pub Box<dyn ScriptStore>);

impl ScriptStoreRes {
  pub fn new(store: impl ScriptStore + 'static) -> Self {
    Self(Box::new(store))
  }
}

/// Sources making up one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelScripts {
  pub main: String,
  pub level: String,
  /// Name of the level file actually read.
  pub resolved: String,
}

impl LevelScripts {
  /// Reads `main` and `level`. A missing main script is treated as empty, a
  /// missing level falls back to [`FALLBACK_LEVEL`].
  pub fn read(store: &dyn ScriptStore, level: &str) -> Result<Self, ScriptError> {
    let main = match store.read(MAIN_SCRIPT) {
      Ok(source) => source,
      Err(ScriptError::Missing { path }) => {
        debug!("No main script at {}", path.display());
        String::new()
      }
      Err(e) => return Err(e),
    };

    let (level_source, resolved) = match store.read(level) {
      Ok(source) => (source, level.to_string()),
      Err(ScriptError::Missing { path }) if level != FALLBACK_LEVEL => {
        warn!(
          "Level script {} not found, falling back to {FALLBACK_LEVEL}",
          path.display()
        );
        (store.read(FALLBACK_LEVEL)?, FALLBACK_LEVEL.to_string())
      }
      Err(e) => return Err(e),
    };

    Ok(Self {
      main,
      level: level_source,
      resolved,
    })
  }

  /// Main and level concatenated into one compilation unit.
  pub fn combined(&self) -> String {
    format!("{}\n{}", self.main, self.level)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_store_reads_and_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("level1.rhai"), "fn onCheck(d) { false }").unwrap();
    let store = FileScriptStore::new(dir.path());

    assert!(store.read("level1").unwrap().contains("onCheck"));
    match store.read("level9") {
      Err(ScriptError::Missing { path }) => assert!(path.ends_with("level9.rhai")),
      other => panic!("expected Missing, got {other:?}"),
    }
  }

  #[test]
  fn missing_level_falls_back_to_test() {
    let store = MemoryScriptStore::new()
      .with("main", "fn helper() { 1 }")
      .with("test", "fn onCheck(d) { true }");

    let scripts = LevelScripts::read(&store, "level42").unwrap();
    assert_eq!(scripts.resolved, "test");
    assert!(scripts.combined().starts_with("fn helper"));
    assert!(scripts.combined().ends_with("{ true }"));
  }

  #[test]
  fn main_is_optional() {
    let store = MemoryScriptStore::new().with("level1", "fn onCheck(d) { false }");
    let scripts = LevelScripts::read(&store, "level1").unwrap();
    assert!(scripts.main.is_empty());
    assert_eq!(scripts.resolved, "level1");
  }

  #[test]
  fn no_level_and_no_fallback_is_missing() {
    let store = MemoryScriptStore::new();
    assert!(matches!(
      LevelScripts::read(&store, "level1"),
      Err(ScriptError::Missing { .. })
    ));
  }
}
