use bevy::{asset::AssetEvent, ecs::message::MessageReader};
use bevy::{camera::ScalingMode, prelude::*, window::PrimaryWindow};
use bevy_common_assets::toml::TomlAssetPlugin;
use bevy_rain::SimulationConfig;

use super::{CONFIG_ASSET, ConfigHandle, ConfigLoaded, GameConfig, asset_root};
use crate::core::camera::GameCamera;

/// Keeps the window, the camera and the simulation in line with
/// `game.config.toml`, reloading it when the file changes.
///
/// The initial config is read synchronously in `main` because the
/// simulation needs it before its plugin is built.
pub struct ConfigPlugin {
  pub initial: GameConfig,
}

impl Plugin for ConfigPlugin {
  fn build(&self, app: &mut App) {
    app
      .insert_resource(ConfigLoaded::from(&self.initial))
      .add_plugins(TomlAssetPlugin::<GameConfig>::new(&["config.toml"]))
      .add_systems(PreStartup, watch_config_file)
      .add_systems(Update, watch_config_changes)
      .add_systems(
        Update,
        (update_window_on_config_change, update_camera_on_config_change),
      );
  }
}

fn watch_config_file(mut commands: Commands, asset_server: Res<AssetServer>) {
  let handle: Handle<GameConfig> = asset_server.load(CONFIG_ASSET);
  commands.insert_resource(ConfigHandle(handle));
}

fn watch_config_changes(
  mut commands: Commands,
  config_handle: Res<ConfigHandle>,
  mut messages: MessageReader<AssetEvent<GameConfig>>,
  configs: Res<Assets<GameConfig>>,
  mut simulation: ResMut<SimulationConfig>,
) {
  for event in messages.read() {
    let AssetEvent::Modified { id } = event else {
      continue;
    };
    if config_handle.0.id() != *id {
      continue;
    }
    let Some(config) = configs.get(&config_handle.0) else {
      continue;
    };

    info!("Config reloaded!");
    commands.insert_resource(ConfigLoaded::from(config));

    let mut reloaded = config.simulation.clone();
    reloaded.scripts_dir = super::resolve(&asset_root(), &reloaded.scripts_dir);
    if reloaded.fixed_hz != simulation.fixed_hz
      || reloaded.pixels_per_meter != simulation.pixels_per_meter
    {
      warn!("fixed_hz and pixels_per_meter only apply after a restart");
      reloaded.fixed_hz = simulation.fixed_hz;
      reloaded.pixels_per_meter = simulation.pixels_per_meter;
    }
    if *simulation != reloaded {
      *simulation = reloaded;
    }
  }
}

fn update_window_on_config_change(
  config: Res<ConfigLoaded>,
  mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
  if !config.is_changed() {
    return;
  }
  if let Ok(mut window) = windows.single_mut() {
    window
      .resolution
      .set(config.window.width as f32, config.window.height as f32);
    window.title.clone_from(&config.window.title);
  }
}

fn update_camera_on_config_change(
  config: Res<ConfigLoaded>,
  mut cameras: Query<(&mut Projection, &mut Transform), With<GameCamera>>,
) {
  if !config.is_changed() {
    return;
  }
  let [x, y] = config.camera.center;
  for (mut projection, mut transform) in &mut cameras {
    if let Projection::Orthographic(ref mut ortho) = *projection {
      ortho.scaling_mode = ScalingMode::AutoMin {
        min_width: config.camera.viewport_width,
        min_height: config.camera.viewport_height,
      };
    }
    transform.translation.x = x;
    transform.translation.y = y;
  }
}
