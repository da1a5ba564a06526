mod plugin;

use std::path::{Path, PathBuf};

use bevy::{asset::Asset, prelude::*, reflect::TypePath};
use bevy_rain::SimulationConfig;
pub use plugin::ConfigPlugin;
use serde::Deserialize;

/// Config file path relative to the asset root.
pub const CONFIG_ASSET: &str = "config/game.config.toml";

#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
pub struct GameConfig {
  pub window: WindowConfig,
  pub camera: CameraConfig,
  #[serde(default)]
  pub simulation: SimulationConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WindowConfig {
  pub width: u32,
  pub height: u32,
  pub title: String,
  #[serde(default)]
  pub fullscreen: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CameraConfig {
  pub viewport_width: f32,
  pub viewport_height: f32,
  /// World point the camera looks at.
  #[serde(default)]
  pub center: [f32; 2],
}

impl GameConfig {
  /// Parses the config and anchors the script directory at `asset_root`.
  pub fn parse(text: &str, asset_root: &Path) -> Result<Self, toml::de::Error> {
    let mut config: Self = toml::from_str(text)?;
    config.simulation.scripts_dir = resolve(asset_root, &config.simulation.scripts_dir);
    Ok(config)
  }
}

/// Relative script paths in the config are relative to the asset root's
/// parent, where `assets/` lives.
fn resolve(asset_root: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    return path.to_path_buf();
  }
  asset_root.parent().unwrap_or(asset_root).join(path)
}

/// Root directory Bevy loads assets from.
pub fn asset_root() -> PathBuf {
  bevy::asset::io::file::FileAssetReader::get_base_path().join("assets")
}

#[derive(Resource)]
pub struct ConfigHandle(pub Handle<GameConfig>);

#[derive(Resource, Debug, Clone)]
pub struct ConfigLoaded {
  pub window: WindowConfig,
  pub camera: CameraConfig,
}

impl From<&GameConfig> for ConfigLoaded {
  fn from(config: &GameConfig) -> Self {
    Self {
      window: config.window.clone(),
      camera: config.camera.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SHIPPED: &str = include_str!("../../assets/config/game.config.toml");

  #[test]
  fn shipped_config_parses() {
    let config = GameConfig::parse(SHIPPED, Path::new("/game/assets")).unwrap();
    assert!(config.window.width > 0);
    assert_eq!(config.simulation.start_level, "level1");
    assert_eq!(
      config.simulation.scripts_dir,
      PathBuf::from("/game/assets/levels")
    );
  }

  #[test]
  fn simulation_section_is_optional() {
    let text = r#"
      [window]
      width = 800
      height = 600
      title = "Rain"

      [camera]
      viewport_width = 640.0
      viewport_height = 480.0
    "#;
    let config = GameConfig::parse(text, Path::new("/game/assets")).unwrap();
    assert_eq!(config.simulation.drops_max, SimulationConfig::default().drops_max);
    assert!(!config.window.fullscreen);
    assert_eq!(config.camera.center, [0.0, 0.0]);
  }

  #[test]
  fn shipped_levels_load_with_their_callbacks() {
    use bevy_rain::script::{Callback, FileScriptStore, load_level};

    let store = FileScriptStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/levels"));
    for level in ["test", "level1", "level2", "level3"] {
      let mut host = load_level(&store, level, 1000);
      assert!(host.degraded().is_none(), "{level}: {:?}", host.degraded());
      assert!(host.callbacks().has(Callback::Check), "{level} has no onCheck");
      host.call_create().unwrap();
      assert!(!host.take_specs().is_empty(), "{level} created nothing");
      assert_eq!(host.call_check(Vec::new()).unwrap(), false, "{level} starts won");
    }
  }

  #[test]
  fn absolute_script_dir_is_kept() {
    assert_eq!(
      resolve(Path::new("/game/assets"), Path::new("/levels")),
      PathBuf::from("/levels")
    );
  }
}
