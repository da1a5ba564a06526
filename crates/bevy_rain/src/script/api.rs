//! Functions and types visible to level scripts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::prelude::*;
use rhai::{Dynamic, Engine, FLOAT, INT};

use crate::actor::{Actor, ActorKind, ActorSpec};

/// Log target of script output.
pub(crate) const SCRIPT_LOG_TARGET: &str = "rain::script";

/// State a level script can write to, shared with the host.
#[derive(Debug, Default)]
pub(crate) struct LevelShared {
  pub specs: Vec<ActorSpec>,
  pub hint: Option<String>,
  pub drops_max: INT,
}

/// The `world` handle passed to `onCreate`.
#[derive(Clone)]
pub struct ScriptWorld {
  shared: Arc<Mutex<LevelShared>>,
}

impl ScriptWorld {
  pub(crate) fn new(shared: Arc<Mutex<LevelShared>>) -> Self {
    Self { shared }
  }

  fn lock(&self) -> MutexGuard<'_, LevelShared> {
    self.shared.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn add(&mut self, spec: ActorSpec) {
    self.lock().specs.push(spec);
  }

  fn set_hint(&mut self, text: &str) {
    self.lock().hint = Some(text.to_string());
  }

  fn drops_max(&mut self) -> INT {
    self.lock().drops_max
  }
}

/// Read-only drop passed to `onCheck`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropView {
  pub id: INT,
  pub x: FLOAT,
  pub y: FLOAT,
  pub vx: FLOAT,
  pub vy: FLOAT,
}

impl DropView {
  pub fn new(actor: &Actor, position: Vec2, velocity: Vec2) -> Self {
    Self {
      id: INT::from(actor.id.0),
      x: position.x,
      y: position.y,
      vx: velocity.x,
      vy: velocity.y,
    }
  }
}

/// Read-only actor passed to the contact callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorView {
  pub id: INT,
  pub kind: &'static str,
  pub name: Option<String>,
  pub x: FLOAT,
  pub y: FLOAT,
  pub vx: FLOAT,
  pub vy: FLOAT,
  pub width: FLOAT,
}

impl ActorView {
  pub fn new(actor: &Actor, position: Vec2, velocity: Vec2, drop_radius: f32) -> Self {
    Self {
      id: INT::from(actor.id.0),
      kind: actor.kind.name(),
      name: actor.name.clone(),
      x: position.x,
      y: position.y,
      vx: velocity.x,
      vy: velocity.y,
      width: actor.kind.width(drop_radius),
    }
  }
}

fn drop_at(x: FLOAT, y: FLOAT) -> ActorSpec {
  ActorSpec::drop(Vec2::new(x, y))
}

fn cloud_at(x: FLOAT, y: FLOAT, width: FLOAT) -> ActorSpec {
  ActorSpec::new(ActorKind::Cloud { width }, Vec2::new(x, y))
}

fn emitter_at(x: FLOAT, y: FLOAT, width: FLOAT) -> ActorSpec {
  ActorSpec::new(ActorKind::Emitter { width }, Vec2::new(x, y))
}

fn ground_at(x: FLOAT, y: FLOAT, w: FLOAT, h: FLOAT) -> ActorSpec {
  ActorSpec::new(
    ActorKind::Static {
      size: Vec2::new(w, h),
    },
    Vec2::new(x, y),
  )
}

fn box_at(x: FLOAT, y: FLOAT, w: FLOAT, h: FLOAT) -> ActorSpec {
  ActorSpec::new(
    ActorKind::Other {
      size: Vec2::new(w, h),
    },
    Vec2::new(x, y),
  )
}

/// Registers the level API on `engine`.
pub(crate) fn register_api(engine: &mut Engine) {
  engine.register_type_with_name::<ScriptWorld>("World");
  engine.register_fn("add", ScriptWorld::add);
  engine.register_fn("set_hint", ScriptWorld::set_hint);
  engine.register_fn("drops_max", ScriptWorld::drops_max);

  engine.register_type_with_name::<ActorSpec>("ActorSpec");
  engine.register_fn("drop_at", drop_at);
  engine.register_fn("cloud_at", cloud_at);
  engine.register_fn("emitter_at", emitter_at);
  engine.register_fn("ground_at", ground_at);
  engine.register_fn("box_at", box_at);
  engine.register_fn("named", |spec: ActorSpec, name: &str| spec.named(name));
  engine.register_fn("rotated", |spec: ActorSpec, radians: FLOAT| {
    spec.rotated(radians)
  });

  engine.register_type_with_name::<DropView>("Drop");
  engine.register_get("id", |d: &mut DropView| d.id);
  engine.register_get("x", |d: &mut DropView| d.x);
  engine.register_get("y", |d: &mut DropView| d.y);
  engine.register_get("vx", |d: &mut DropView| d.vx);
  engine.register_get("vy", |d: &mut DropView| d.vy);

  engine.register_type_with_name::<ActorView>("Actor");
  engine.register_get("id", |a: &mut ActorView| a.id);
  engine.register_get("kind", |a: &mut ActorView| a.kind.to_string());
  engine.register_get("name", |a: &mut ActorView| match &a.name {
    Some(name) => Dynamic::from(name.clone()),
    None => Dynamic::UNIT,
  });
  engine.register_get("x", |a: &mut ActorView| a.x);
  engine.register_get("y", |a: &mut ActorView| a.y);
  engine.register_get("vx", |a: &mut ActorView| a.vx);
  engine.register_get("vy", |a: &mut ActorView| a.vy);
  engine.register_get("width", |a: &mut ActorView| a.width);

  engine.register_fn("log", |text: &str| {
    log::info!(target: SCRIPT_LOG_TARGET, "{text}");
  });
  engine.on_print(|text| log::info!(target: SCRIPT_LOG_TARGET, "{text}"));
  engine.on_debug(|text, source, pos| {
    log::debug!(target: SCRIPT_LOG_TARGET, "{}{pos:?}: {text}", source.unwrap_or(""));
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  fn engine() -> Engine {
    let mut engine = Engine::new();
    register_api(&mut engine);
    engine
  }

  #[test]
  fn constructors_build_specs() {
    let spec: ActorSpec = engine()
      .eval(r#"cloud_at(10.0, 200.0, 90.0).named("sky").rotated(0.25)"#)
      .unwrap();
    assert_eq!(spec.kind, ActorKind::Cloud { width: 90.0 });
    assert_eq!(spec.position, Vec2::new(10.0, 200.0));
    assert_eq!(spec.name.as_deref(), Some("sky"));
    assert_eq!(spec.rotation, 0.25);
  }

  #[test]
  fn world_collects_specs_and_hint() {
    let shared = Arc::new(Mutex::new(LevelShared {
      drops_max: 5,
      ..Default::default()
    }));
    let engine = engine();
    let mut scope = rhai::Scope::new();
    scope.push("world", ScriptWorld::new(shared.clone()));

    let max: INT = engine
      .eval_with_scope(
        &mut scope,
        r#"
        world.add(ground_at(0.0, 0.0, 400.0, 10.0));
        world.add(box_at(5.0, 50.0, 20.0, 20.0).named("crate"));
        world.set_hint("fill the bucket");
        world.drops_max()
        "#,
      )
      .unwrap();

    let shared = shared.lock().unwrap();
    assert_eq!(max, 5);
    assert_eq!(shared.specs.len(), 2);
    assert_eq!(shared.specs[1].name.as_deref(), Some("crate"));
    assert_eq!(shared.hint.as_deref(), Some("fill the bucket"));
  }

  #[test]
  fn views_expose_fields() {
    let engine = engine();
    let mut scope = rhai::Scope::new();
    scope.push(
      "a",
      ActorView {
        id: 3,
        kind: "static",
        name: None,
        x: 1.0,
        y: 2.0,
        vx: 0.0,
        vy: 0.0,
        width: 40.0,
      },
    );
    let unnamed: bool = engine
      .eval_with_scope(&mut scope, r#"type_of(a.name) == "()" && a.kind == "static" && a.width > 39.0"#)
      .unwrap();
    assert!(unnamed);
  }
}
