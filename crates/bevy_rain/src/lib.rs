//! Rain - scripted liquid-drop simulation plugin for Bevy.
//!
//! Drops are small Rapier balls held together by a pairwise liquid force.
//! Level scripts (Rhai) build the world in `onCreate`, watch the drops in
//! `onCheck` and react to contacts. The player steers a cloud and an emitter
//! through [`Intent`]s.
//!
//! The crate is headless: it needs `MinimalPlugins` (or `DefaultPlugins`)
//! and `TransformPlugin`, and adds Rapier itself. Insert a
//! [`SimulationConfig`] before adding [`RainPlugin`] to tune it, then write a
//! [`LoadLevel`] message to start playing.
//!
//! ```ignore
//! app
//!   .insert_resource(SimulationConfig::default())
//!   .add_plugins(RainPlugin);
//! app.world_mut().write_message(LoadLevel::named("level1"));
//! ```

use bevy::prelude::*;
use bevy_rapier2d::prelude::PhysicsSet;

pub mod actor;
pub mod config;
pub mod contact;
pub mod drops;
pub mod intent;
pub mod level;
pub mod liquid;
pub mod physics;
pub mod schedule;
pub mod script;
pub mod source;
pub mod spawn;

pub use actor::{Actor, ActorId, ActorKind, ActorSpawner, ActorSpec};
pub use config::{LaunchForceMode, LiquidParams, SimulationConfig};
pub use contact::{ContactEvent, ContactPhase};
pub use drops::DropStore;
pub use intent::{
  Intent, IntentEvent, IntentQueue, IntentRecorder, IntentRecording, IntentReplay, RecordingError,
};
pub use level::{LevelId, LevelOutcome, LevelState, LevelWon, LoadLevel, SimClock};
pub use liquid::liquid_forces;
pub use physics::{PendingForce, RainPhysicsPlugin, SimulationToggles};
pub use schedule::RainSet;
pub use script::{
  FileScriptStore, MemoryScriptStore, ScriptError, ScriptHost, ScriptStore, ScriptStoreRes,
};
pub use source::{LiquidSource, LiquidSources, SourceDirection};
pub use spawn::{SpawnController, SpawnRng};

/// The whole simulation: physics, liquid, spawning, scripts and levels.
///
/// Reads [`SimulationConfig`] at build time. Scripts come from a
/// [`FileScriptStore`] over `scripts_dir` unless a [`ScriptStoreRes`] is
/// inserted.
#[derive(Default)]
pub struct RainPlugin;

impl Plugin for RainPlugin {
  fn build(&self, app: &mut App) {
    let config = app
      .world()
      .get_resource::<SimulationConfig>()
      .cloned()
      .unwrap_or_default();

    app.add_plugins(RainPhysicsPlugin {
      pixels_per_meter: config.pixels_per_meter,
      fixed_hz: config.fixed_hz,
    });

    if !app.world().contains_resource::<ScriptStoreRes>() {
      app.insert_resource(ScriptStoreRes::new(FileScriptStore::new(
        config.scripts_dir.clone(),
      )));
    }

    app
      .insert_resource(SpawnRng::seeded(config.seed))
      .insert_resource(ScriptHost::inert("no level loaded", config.drops_max))
      .insert_resource(config)
      .init_resource::<DropStore>()
      .init_resource::<LiquidSources>()
      .init_resource::<actor::ActorIds>()
      .init_resource::<SimClock>()
      .init_resource::<SpawnController>()
      .init_resource::<IntentQueue>()
      .init_resource::<IntentRecorder>()
      .init_resource::<IntentReplay>()
      .init_resource::<LevelState>()
      .init_resource::<LevelId>()
      .init_resource::<LevelOutcome>()
      .init_resource::<level::PendingLoad>()
      .add_message::<LoadLevel>()
      .add_message::<LevelWon>()
      .add_message::<ContactEvent>();

    app.configure_sets(
      FixedUpdate,
      (
        RainSet::Intents,
        RainSet::Forces,
        PhysicsSet::SyncBackend,
        PhysicsSet::StepSimulation,
        PhysicsSet::Writeback,
        RainSet::Contacts,
        RainSet::Spawn,
        RainSet::Check,
      )
        .chain(),
    );
    for set in [
      RainSet::Intents,
      RainSet::Forces,
      RainSet::Contacts,
      RainSet::Spawn,
      RainSet::Check,
    ] {
      app.configure_sets(FixedUpdate, set.run_if(level::level_running));
    }

    app
      .add_systems(
        PreUpdate,
        (level::handle_load_requests, level::finish_loading).chain(),
      )
      .add_systems(
        FixedUpdate,
        (
          level::advance_clock,
          intent::apply_intents,
          physics::sync_physics_settings,
        )
          .chain()
          .in_set(RainSet::Intents),
      )
      .add_systems(
        FixedUpdate,
        (
          liquid::apply_liquid_constraint.run_if(physics::liquid_forces_enabled),
          physics::flush_forces,
        )
          .chain()
          .in_set(RainSet::Forces),
      )
      .add_systems(
        FixedUpdate,
        contact::dispatch_contacts.in_set(RainSet::Contacts),
      )
      .add_systems(
        FixedUpdate,
        (spawn::spawn_from_sources, spawn::spawn_painted)
          .chain()
          .in_set(RainSet::Spawn),
      )
      .add_systems(
        FixedUpdate,
        level::check_outcome.in_set(RainSet::Check),
      );
  }
}
