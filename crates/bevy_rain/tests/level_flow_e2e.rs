//! E2E tests for the level lifecycle: loading, fallback, the win latch and
//! reloading.
//!
//! Run with: cargo test -p bevy_rain --test level_flow_e2e

mod common;

use bevy::ecs::message::MessageCursor;
use bevy_rain::{
  Intent, LevelId, LevelState, LevelWon, MemoryScriptStore, ScriptHost, SimulationConfig,
};
use common::{MAIN, TestHarness, small_config};

const FULL_LEVEL: &str = r#"
  fn onCreate(world) {
    floor(world);
    world.add(cloud_at(0.0, 120.0, 90.0).named("sky"));
    world.set_hint("Fill it up");
    this.created = true;
  }

  fn onCheck(drops) {
    drops.len() >= 2
  }

  fn onBeginContact(a, b) {}
  fn onEndContact(a, b) {}
"#;

const TEST_LEVEL: &str = r#"
  fn onCreate(world) {
    floor(world);
  }

  fn onCheck(drops) { false }
"#;

#[test]
fn nothing_runs_before_a_level_is_loaded() {
  let mut harness = TestHarness::with_level(small_config(10), "level1", FULL_LEVEL);
  assert_eq!(harness.state(), LevelState::Loading);

  harness.ticks(5);

  assert_eq!(harness.state(), LevelState::Loading);
  assert_eq!(harness.clock().tick, 0);
  assert_eq!(harness.actor_count(), 0);
}

#[test]
fn well_formed_level_plays_with_every_callback() {
  let mut harness = TestHarness::with_level(small_config(10), "level1", FULL_LEVEL);
  harness.load("level1");

  assert_eq!(harness.state(), LevelState::Playing);
  let host = harness.resource::<ScriptHost>();
  assert!(host.callbacks().is_complete());
  assert!(host.degraded().is_none());
  assert_eq!(harness.outcome().hint.as_deref(), Some("Fill it up"));

  // Floor from main.rhai plus the cloud.
  assert_eq!(harness.actor_count(), 2);
  assert!(harness.actor_named("floor").is_some());
  assert!(harness.actor_named("sky").is_some());

  let level = harness.resource::<LevelId>();
  assert_eq!(level.name, "level1");
  assert_eq!(level.number, 1);
}

#[test]
fn missing_level_falls_back_to_test_level() {
  let store = MemoryScriptStore::new()
    .with("main", MAIN)
    .with("test", TEST_LEVEL);
  let mut harness = TestHarness::new(small_config(10), store);
  harness.load("level7");

  assert_eq!(harness.state(), LevelState::Playing);
  assert!(harness.resource::<ScriptHost>().degraded().is_some());
  assert_eq!(harness.resource::<LevelId>().number, 7);
  assert!(harness.actor_named("floor").is_some());

  harness.ticks(30);
  assert_eq!(harness.state(), LevelState::Playing);
}

#[test]
fn broken_level_simulates_but_never_wins() {
  let store = MemoryScriptStore::new()
    .with("main", MAIN)
    .with("level1", "fn onCreate(world) { world.add(");
  let mut harness = TestHarness::new(small_config(10), store);
  harness.load("level1");

  assert_eq!(harness.state(), LevelState::Playing);
  assert!(harness.resource::<ScriptHost>().degraded().is_some());

  harness.ticks(60);
  assert_eq!(harness.clock().tick, 60);
  assert_eq!(harness.state(), LevelState::Playing);
  assert!(!harness.outcome().won);
}

#[test]
fn win_latches_once() {
  let mut harness = TestHarness::with_level(small_config(10), "level1", FULL_LEVEL);
  let mut cursor = MessageCursor::<LevelWon>::default();
  harness.load("level1");
  harness.press(Intent::Action);

  let mut won_at = None;
  for _ in 0..120 {
    harness.tick();
    if won_at.is_none() && harness.state() == LevelState::Won {
      won_at = Some(harness.clock().tick);
    }
  }

  let won_at = won_at.expect("two drops should win the level");
  let outcome = harness.outcome();
  assert!(outcome.won);
  assert_eq!(outcome.won_at_tick, Some(won_at));
  assert_eq!(harness.state(), LevelState::Won);

  // onCheck keeps answering true, the message is still written once.
  let messages = harness.read_messages(&mut cursor);
  assert_eq!(
    messages,
    vec![LevelWon {
      level: "level1".into(),
      tick: won_at,
    }]
  );

  // Spawning stopped at the win, the simulation kept running.
  assert_eq!(harness.drop_count(), 2);
  assert_eq!(harness.clock().tick, 120);
}

#[test]
fn failing_check_is_counted_and_does_not_win() {
  let level = r#"
    fn onCreate(world) { floor(world); }
    fn onCheck(drops) { throw "nope"; }
  "#;
  let mut harness = TestHarness::with_level(small_config(10), "level1", level);
  harness.load("level1");

  harness.ticks(10);

  let outcome = harness.outcome();
  assert!(!outcome.won);
  assert_eq!(outcome.check_errors, 10);
}

#[test]
fn reload_resets_the_level() {
  let mut harness = TestHarness::with_level(small_config(50), "level1", FULL_LEVEL);
  harness.load("level1");
  harness.press(Intent::Action);
  harness.ticks(40);
  assert!(harness.drop_count() > 0);
  assert!(harness.outcome().won);

  harness.load("level1");

  assert_eq!(harness.state(), LevelState::Playing);
  assert_eq!(harness.drop_count(), 0);
  assert_eq!(harness.clock().tick, 0);
  assert!(!harness.outcome().won);
  assert_eq!(harness.actor_count(), 2);

  // The held button did not survive the reload.
  harness.ticks(10);
  assert_eq!(harness.drop_count(), 0);
}

#[test]
fn drops_max_reaches_the_script() {
  let level = r#"
    fn onCreate(world) {
      let n = world.drops_max();
      let i = 0;
      while i < n {
        world.add(drop_at(i * 10.0, 0.0));
        i += 1;
      }
    }
    fn onCheck(drops) { drops.len() == 4 }
  "#;
  let config = SimulationConfig {
    drops_max: 4,
    ..small_config(4)
  };
  let mut harness = TestHarness::with_level(config, "level1", level);
  harness.load("level1");

  assert_eq!(harness.drop_count(), 4);
  harness.tick();
  assert!(harness.outcome().won);
}

#[test]
fn drops_past_the_cap_are_refused_at_creation() {
  let level = r#"
    fn onCreate(world) {
      for i in 0..10 {
        world.add(drop_at(i * 10.0, 0.0));
      }
      world.add(box_at(0.0, 50.0, 10.0, 10.0).named("crate"));
    }
    fn onCheck(drops) { false }
  "#;
  let mut harness = TestHarness::with_level(small_config(4), "level1", level);
  harness.load("level1");

  assert_eq!(harness.drop_count(), 4);
  // Only drops are capped.
  assert!(harness.actor_named("crate").is_some());
  assert_eq!(harness.actor_count(), 5);

  harness.tick();
  assert_eq!(harness.drop_count(), 4);
}
