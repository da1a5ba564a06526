//! Compiled level script and its callbacks.

use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;
use rhai::{AST, Array, CallFnOptions, Dynamic, Engine, FuncArgs, INT, Map, Scope};

use super::ScriptError;
use super::api::{ActorView, DropView, LevelShared, ScriptWorld, register_api};
use super::store::{FALLBACK_LEVEL, LevelScripts, ScriptStore};
use crate::actor::ActorSpec;
use crate::contact::ContactPhase;

/// Operation budget of one callback invocation.
const MAX_OPERATIONS: u64 = 1_000_000;

const MAX_CALL_LEVELS: usize = 32;

/// Named entry points a level script may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
  Create,
  Check,
  BeginContact,
  EndContact,
}

impl Callback {
  pub const ALL: [Self; 4] = [
    Self::Create,
    Self::Check,
    Self::BeginContact,
    Self::EndContact,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Create => "onCreate",
      Self::Check => "onCheck",
      Self::BeginContact => "onBeginContact",
      Self::EndContact => "onEndContact",
    }
  }

  pub fn arity(self) -> usize {
    match self {
      Self::Create | Self::Check => 1,
      Self::BeginContact | Self::EndContact => 2,
    }
  }
}

/// Which callbacks the loaded script defines. Resolved once at load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptCallbackSet {
  pub create: bool,
  pub check: bool,
  pub begin_contact: bool,
  pub end_contact: bool,
}

impl ScriptCallbackSet {
  /// Looks the callbacks up by name and arity. A callback with the wrong
  /// number of parameters counts as absent.
  pub fn resolve(ast: &AST) -> Self {
    let mut set = Self::default();
    for callback in Callback::ALL {
      let arities: Vec<usize> = ast
        .iter_functions()
        .filter(|f| f.name == callback.name())
        .map(|f| f.params.len())
        .collect();
      if arities.is_empty() {
        continue;
      }
      if arities.contains(&callback.arity()) {
        *set.slot(callback) = true;
      } else {
        warn!(
          "{} takes {} parameter(s), found {:?}; ignoring it",
          callback.name(),
          callback.arity(),
          arities
        );
      }
    }
    set
  }

  fn slot(&mut self, callback: Callback) -> &mut bool {
    match callback {
      Callback::Create => &mut self.create,
      Callback::Check => &mut self.check,
      Callback::BeginContact => &mut self.begin_contact,
      Callback::EndContact => &mut self.end_contact,
    }
  }

  pub fn has(&self, callback: Callback) -> bool {
    match callback {
      Callback::Create => self.create,
      Callback::Check => self.check,
      Callback::BeginContact => self.begin_contact,
      Callback::EndContact => self.end_contact,
    }
  }

  pub fn is_complete(&self) -> bool {
    Callback::ALL.into_iter().all(|c| self.has(c))
  }
}

/// The level script of the running level.
///
/// Every callback runs with the same `this` object map bound, which is where
/// scripts keep state between calls. Rhai functions cannot see globals.
#[derive(Resource)]
pub struct ScriptHost {
  engine: Engine,
  ast: AST,
  callbacks: ScriptCallbackSet,
  this: Dynamic,
  shared: Arc<Mutex<LevelShared>>,
  degraded: Option<String>,
  check_type_warned: bool,
}

fn build_engine() -> Engine {
  let mut engine = Engine::new();
  engine.set_max_operations(MAX_OPERATIONS);
  engine.set_max_call_levels(MAX_CALL_LEVELS);
  engine.set_max_expr_depths(64, 64);
  engine.disable_symbol("eval");
  register_api(&mut engine);
  engine
}

impl ScriptHost {
  fn with_parts(engine: Engine, ast: AST, callbacks: ScriptCallbackSet, drops_max: usize) -> Self {
    let shared = LevelShared {
      drops_max: INT::try_from(drops_max).unwrap_or(INT::MAX),
      ..Default::default()
    };
    Self {
      engine,
      ast,
      callbacks,
      this: Dynamic::from_map(Map::new()),
      shared: Arc::new(Mutex::new(shared)),
      degraded: None,
      check_type_warned: false,
    }
  }

  /// Compiles `source`, runs its top-level statements and resolves the
  /// callbacks.
  pub fn load(source: &str, drops_max: usize) -> Result<Self, ScriptError> {
    let engine = build_engine();
    let ast = engine
      .compile(source)
      .map_err(|e| ScriptError::Compile(e.to_string()))?;
    engine
      .run_ast(&ast)
      .map_err(|e| ScriptError::Runtime(e.to_string()))?;

    let callbacks = ScriptCallbackSet::resolve(&ast);
    if !callbacks.check {
      warn!("Level script has no onCheck; the level cannot be won");
    }
    Ok(Self::with_parts(engine, ast, callbacks, drops_max))
  }

  /// A host without callbacks. The level simulates but never wins.
  pub fn inert(reason: impl Into<String>, drops_max: usize) -> Self {
    let mut host = Self::with_parts(
      build_engine(),
      AST::empty(),
      ScriptCallbackSet::default(),
      drops_max,
    );
    host.degraded = Some(reason.into());
    host
  }

  pub fn callbacks(&self) -> ScriptCallbackSet {
    self.callbacks
  }

  /// Why the level runs on a fallback, if it does.
  pub fn degraded(&self) -> Option<&str> {
    self.degraded.as_deref()
  }

  /// Hint set by the script through `world.set_hint`.
  pub fn hint(&self) -> Option<String> {
    self.lock_shared().hint.clone()
  }

  /// Drains the actor specs queued through `world.add`.
  pub fn take_specs(&mut self) -> Vec<ActorSpec> {
    std::mem::take(&mut self.lock_shared().specs)
  }

  fn lock_shared(&self) -> std::sync::MutexGuard<'_, LevelShared> {
    self.shared.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn call(&mut self, callback: Callback, args: impl FuncArgs) -> Result<Dynamic, ScriptError> {
    let mut scope = Scope::new();
    let options = CallFnOptions::new()
      .eval_ast(false)
      .rewind_scope(true)
      .bind_this_ptr(&mut self.this);
    self
      .engine
      .call_fn_with_options::<Dynamic>(options, &mut scope, &self.ast, callback.name(), args)
      .map_err(|e| ScriptError::Runtime(format!("{}: {e}", callback.name())))
  }

  /// Runs `onCreate(world)`. Specs queued before a failure stay queued.
  pub fn call_create(&mut self) -> Result<(), ScriptError> {
    if !self.callbacks.create {
      return Ok(());
    }
    let world = ScriptWorld::new(self.shared.clone());
    self.call(Callback::Create, (world,)).map(|_| ())
  }

  /// Runs `onCheck(drops)` and interprets the result as "won".
  ///
  /// `true` and non-zero integers win. Anything else is a loss, reported
  /// once per level.
  pub fn call_check(&mut self, drops: Vec<DropView>) -> Result<bool, ScriptError> {
    if !self.callbacks.check {
      return Ok(false);
    }
    let drops: Array = drops.into_iter().map(Dynamic::from).collect();
    let result = self.call(Callback::Check, (drops,))?;
    match bool_like(&result) {
      Some(won) => Ok(won),
      None => {
        if !self.check_type_warned {
          self.check_type_warned = true;
          warn!(
            "onCheck returned {}, expected bool or int; treating as not won",
            result.type_name()
          );
        }
        Ok(false)
      }
    }
  }

  /// Runs the contact callback for `phase`. Returns whether one was
  /// defined.
  pub fn call_contact(
    &mut self,
    phase: ContactPhase,
    a: ActorView,
    b: ActorView,
  ) -> Result<bool, ScriptError> {
    let callback = match phase {
      ContactPhase::Begin => Callback::BeginContact,
      ContactPhase::End => Callback::EndContact,
    };
    if !self.callbacks.has(callback) {
      return Ok(false);
    }
    self.call(callback, (a, b)).map(|_| true)
  }
}

fn bool_like(value: &Dynamic) -> Option<bool> {
  if let Ok(won) = value.as_bool() {
    Some(won)
  } else if let Ok(n) = value.as_int() {
    Some(n != 0)
  } else {
    None
  }
}

/// Loads the scripts of `level`, degrading instead of failing.
///
/// A missing level falls back to the test level. A level that does not
/// compile falls back to the test level too, and when that fails as well the
/// level runs with an inert host.
pub fn load_level(store: &dyn ScriptStore, level: &str, drops_max: usize) -> ScriptHost {
  let scripts = match LevelScripts::read(store, level) {
    Ok(scripts) => scripts,
    Err(err) => {
      error!("Level {level}: {err}; running without a script");
      return ScriptHost::inert(err.to_string(), drops_max);
    }
  };

  match ScriptHost::load(&scripts.combined(), drops_max) {
    Ok(mut host) => {
      if scripts.resolved != level {
        host.degraded = Some(format!("{level} not found, using {}", scripts.resolved));
      }
      info!(
        "Loaded level script {} ({:?})",
        scripts.resolved,
        host.callbacks()
      );
      host
    }
    Err(err) => {
      error!("Level {}: {err}", scripts.resolved);
      fallback_host(store, &scripts, drops_max)
        .unwrap_or_else(|| ScriptHost::inert(err.to_string(), drops_max))
    }
  }
}

fn fallback_host(
  store: &dyn ScriptStore,
  failed: &LevelScripts,
  drops_max: usize,
) -> Option<ScriptHost> {
  if failed.resolved == FALLBACK_LEVEL {
    return None;
  }
  let fallback = LevelScripts {
    main: failed.main.clone(),
    level: store.read(FALLBACK_LEVEL).ok()?,
    resolved: FALLBACK_LEVEL.to_string(),
  };
  match ScriptHost::load(&fallback.combined(), drops_max) {
    Ok(mut host) => {
      warn!("Running {} with the {FALLBACK_LEVEL} script", failed.resolved);
      host.degraded = Some(format!("{} failed to load", failed.resolved));
      Some(host)
    }
    Err(err) => {
      error!("Fallback level: {err}");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::script::MemoryScriptStore;

  const FULL: &str = r#"
    fn onCreate(world) {
      world.add(ground_at(0.0, 0.0, 400.0, 10.0).named("floor"));
      world.add(cloud_at(0.0, 300.0, 90.0));
      world.set_hint("fill it");
      this.hits = 0;
    }
    fn onCheck(drops) { drops.len() >= 3 || this.hits >= 2 }
    fn onBeginContact(a, b) { this.hits += 1; }
    fn onEndContact(a, b) { }
  "#;

  fn drop_view(id: INT) -> DropView {
    DropView {
      id,
      x: 0.0,
      y: 0.0,
      vx: 0.0,
      vy: 0.0,
    }
  }

  fn actor_view(id: INT) -> ActorView {
    ActorView {
      id,
      kind: "static",
      name: None,
      x: 0.0,
      y: 0.0,
      vx: 0.0,
      vy: 0.0,
      width: 10.0,
    }
  }

  #[test]
  fn full_script_resolves_every_callback() {
    let mut host = ScriptHost::load(FULL, 1000).unwrap();
    assert!(host.callbacks().is_complete());
    assert!(host.degraded().is_none());

    host.call_create().unwrap();
    let specs = host.take_specs();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].name.as_deref(), Some("floor"));
    assert_eq!(host.hint().as_deref(), Some("fill it"));

    assert!(!host.call_check(vec![drop_view(0)]).unwrap());
    assert!(host.call_check((0..3).map(drop_view).collect()).unwrap());
  }

  #[test]
  fn this_keeps_state_between_callbacks() {
    let mut host = ScriptHost::load(FULL, 1000).unwrap();
    host.call_create().unwrap();
    for _ in 0..2 {
      assert!(
        host
          .call_contact(ContactPhase::Begin, actor_view(1), actor_view(2))
          .unwrap()
      );
    }
    assert!(host.call_check(Vec::new()).unwrap());
  }

  #[test]
  fn wrong_arity_counts_as_absent() {
    let host = ScriptHost::load("fn onCheck() { true } fn onBeginContact(a) {}", 10).unwrap();
    assert!(!host.callbacks().check);
    assert!(!host.callbacks().begin_contact);
  }

  #[test]
  fn missing_callbacks_are_tolerated() {
    let mut host = ScriptHost::load("fn onCheck(d) { 1 }", 10).unwrap();
    assert!(host.call_check(Vec::new()).unwrap());
    assert!(
      !host
        .call_contact(ContactPhase::End, actor_view(1), actor_view(2))
        .unwrap()
    );
    host.call_create().unwrap();
    assert!(host.take_specs().is_empty());
  }

  #[test]
  fn non_bool_result_is_not_won() {
    let mut host = ScriptHost::load(r#"fn onCheck(d) { "yes" }"#, 10).unwrap();
    assert!(!host.call_check(Vec::new()).unwrap());
    assert!(!host.call_check(Vec::new()).unwrap());
  }

  #[test]
  fn errors_are_classified() {
    assert!(matches!(
      ScriptHost::load("fn onCheck(d) {", 10),
      Err(ScriptError::Compile(_))
    ));

    let mut host = ScriptHost::load("fn onCheck(d) { throw \"boom\"; }", 10).unwrap();
    let err = host.call_check(Vec::new()).unwrap_err();
    assert!(matches!(err, ScriptError::Runtime(ref msg) if msg.contains("onCheck")));
  }

  #[test]
  fn runaway_script_is_stopped() {
    let mut host = ScriptHost::load("fn onCheck(d) { loop { } }", 10).unwrap();
    assert!(matches!(
      host.call_check(Vec::new()),
      Err(ScriptError::Runtime(_))
    ));
  }

  #[test]
  fn eval_is_disabled() {
    assert!(ScriptHost::load(r#"fn onCheck(d) { eval("true") }"#, 10).is_err());
  }

  #[test]
  fn broken_level_falls_back_to_test() {
    let store = MemoryScriptStore::new()
      .with("level1", "fn onCheck(d) {")
      .with("test", "fn onCheck(d) { false }");
    let host = load_level(&store, "level1", 10);
    assert!(host.callbacks().check);
    assert!(host.degraded().is_some());
  }

  #[test]
  fn nothing_loadable_gives_inert_host() {
    let store = MemoryScriptStore::new().with("test", "fn onCheck(d) {");
    let mut host = load_level(&store, "level1", 10);
    assert_eq!(host.callbacks(), ScriptCallbackSet::default());
    assert!(host.degraded().is_some());
    assert!(!host.call_check(Vec::new()).unwrap());
  }
}
