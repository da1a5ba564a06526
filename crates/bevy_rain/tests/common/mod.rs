//! Headless harness shared by the e2e tests.
//!
//! `app.update()` never runs a fixed tick here (virtual time does not
//! advance), so every test steps the simulation explicitly with
//! [`TestHarness::tick`].

#![allow(dead_code)]

use std::time::Duration;

use bevy::ecs::message::{MessageCursor, Messages};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rain::{
  Actor, DropStore, Intent, IntentQueue, LevelOutcome, LevelState, LoadLevel, MemoryScriptStore,
  RainPlugin, ScriptStoreRes, SimClock, SimulationConfig,
};

/// Shared `main.rhai` used by most tests.
pub const MAIN: &str = r#"
  fn floor(world) {
    world.add(ground_at(0.0, -100.0, 2000.0, 10.0).named("floor"));
  }
"#;

pub struct TestHarness {
  pub app: App,
}

impl TestHarness {
  pub fn new(config: SimulationConfig, store: MemoryScriptStore) -> Self {
    let mut app = App::new();
    app
      .add_plugins(MinimalPlugins)
      .add_plugins(bevy::transform::TransformPlugin)
      .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO))
      .insert_resource(config)
      .add_plugins(RainPlugin)
      .insert_resource(ScriptStoreRes::new(store));

    // Startup: Rapier creates its context.
    app.update();

    Self { app }
  }

  /// Harness with one level script and the shared main script.
  pub fn with_level(config: SimulationConfig, name: &str, source: &str) -> Self {
    Self::new(
      config,
      MemoryScriptStore::new().with("main", MAIN).with(name, source),
    )
  }

  pub fn load(&mut self, name: &str) {
    self.send_load(LoadLevel::named(name));
  }

  pub fn send_load(&mut self, load: LoadLevel) {
    self.app.world_mut().write_message(load);
    self.app.update();
  }

  /// Runs one fixed simulation tick.
  pub fn tick(&mut self) {
    self.app.world_mut().run_schedule(FixedUpdate);
  }

  pub fn ticks(&mut self, n: usize) {
    for _ in 0..n {
      self.tick();
    }
  }

  pub fn press(&mut self, intent: Intent) {
    self.app.world_mut().resource_mut::<IntentQueue>().press(intent);
  }

  pub fn release(&mut self, intent: Intent) {
    self.app.world_mut().resource_mut::<IntentQueue>().release(intent);
  }

  pub fn resource<R: Resource>(&self) -> &R {
    self.app.world().resource::<R>()
  }

  pub fn state(&self) -> LevelState {
    *self.resource::<LevelState>()
  }

  pub fn outcome(&self) -> LevelOutcome {
    self.resource::<LevelOutcome>().clone()
  }

  pub fn clock(&self) -> SimClock {
    *self.resource::<SimClock>()
  }

  pub fn drop_count(&self) -> usize {
    self.resource::<DropStore>().len()
  }

  /// Drop positions in store order.
  pub fn drop_positions(&self) -> Vec<Vec2> {
    let world = self.app.world();
    self
      .resource::<DropStore>()
      .iter()
      .filter_map(|e| world.get::<Transform>(e))
      .map(|t| t.translation.truncate())
      .collect()
  }

  /// Number of live actors of any kind.
  pub fn actor_count(&mut self) -> usize {
    let world = self.app.world_mut();
    world.query::<&Actor>().iter(world).count()
  }

  pub fn actor_named(&mut self, name: &str) -> Option<Entity> {
    let world = self.app.world_mut();
    world
      .query::<(Entity, &Actor)>()
      .iter(world)
      .find(|(_, actor)| actor.name.as_deref() == Some(name))
      .map(|(entity, _)| entity)
  }

  /// Reads every message of type `M` the cursor has not seen yet.
  pub fn read_messages<M: Message + Clone>(&self, cursor: &mut MessageCursor<M>) -> Vec<M> {
    let messages = self.app.world().resource::<Messages<M>>();
    cursor.read(messages).cloned().collect()
  }
}

/// Config with a small population cap and a fixed seed.
pub fn small_config(drops_max: usize) -> SimulationConfig {
  SimulationConfig {
    drops_max,
    seed: 7,
    ..Default::default()
  }
}
