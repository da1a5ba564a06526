mod config;
mod console;
mod core;
mod hud;
mod input;
mod render;
mod visual_debug;

use std::path::PathBuf;

use bevy::{
  prelude::*,
  window::{MonitorSelection, PresentMode, WindowMode, WindowResolution},
};
use bevy_rain::{IntentRecording, LoadLevel, RainPlugin};
use clap::Parser;

/// Rain: steer the cloud, fill the level with water.
#[derive(Parser, Debug)]
#[command(name = "rain")]
struct Cli {
  /// Level to start in instead of the configured one
  #[arg(short, long)]
  level: Option<String>,

  /// Spawn seed override
  #[arg(short, long)]
  seed: Option<u64>,

  /// Replay a recording written with `record save`
  #[arg(short, long)]
  replay: Option<PathBuf>,

  /// Reduced spawn rate and liquid for slow machines
  #[arg(long)]
  light: bool,
}

fn main() {
  let cli = Cli::parse();

  let asset_root = config::asset_root();
  let config_path = asset_root.join(config::CONFIG_ASSET);
  let config_str = std::fs::read_to_string(&config_path)
    .unwrap_or_else(|e| panic!("Failed to read {}: {e}", config_path.display()));
  let config =
    config::GameConfig::parse(&config_str, &asset_root).expect("Failed to parse config");

  let mut simulation = config.simulation.clone();
  if let Some(seed) = cli.seed {
    simulation.seed = seed;
  }
  simulation.light_mode |= cli.light;

  let first_load = match &cli.replay {
    Some(path) => {
      let recording = IntentRecording::load(path).expect("Failed to read recording");
      LoadLevel::replaying(&recording)
    }
    None => LoadLevel::named(cli.level.unwrap_or_else(|| simulation.start_level.clone())),
  };

  let mut app = App::new();

  app.add_plugins(
    DefaultPlugins
      .set(ImagePlugin::default_nearest())
      .set(WindowPlugin {
        primary_window: Some(Window {
          resolution: WindowResolution::new(config.window.width, config.window.height),
          title: config.window.title.clone(),
          present_mode: PresentMode::AutoVsync,
          mode: if config.window.fullscreen {
            WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
          } else {
            WindowMode::Windowed
          },
          ..default()
        }),
        ..default()
      })
      // Gizmos only, no 3D.
      .disable::<bevy::pbr::PbrPlugin>(),
  );

  // The rain plugin reads its config at build time.
  app
    .insert_resource(simulation)
    .add_plugins(RainPlugin)
    .add_plugins(config::ConfigPlugin { initial: config })
    .add_plugins(core::CorePlugin)
    .add_plugins(input::InputPlugin)
    .add_plugins(hud::HudPlugin)
    .add_plugins(console::ConsolePlugins)
    .add_plugins(render::RenderPlugin)
    .add_plugins(visual_debug::VisualDebugPlugin);

  app.world_mut().write_message(first_load);

  app.run();
}
