//! egui overlay: level status in the corner and the outcome menu.

use bevy::app::AppExit;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use bevy_rain::{
  DropStore, LevelId, LevelOutcome, LevelState, LoadLevel, ScriptHost, SimulationConfig,
  SimulationToggles,
};

/// Menu opened with Escape. The menu also shows on its own once the level
/// is won.
#[derive(Resource, Default, Debug)]
pub struct MenuOpen(pub bool);

pub struct HudPlugin;

impl Plugin for HudPlugin {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
      app.add_plugins(EguiPlugin::default());
    }
    if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
      app.add_plugins(FrameTimeDiagnosticsPlugin::default());
    }
    app
      .init_resource::<MenuOpen>()
      .add_systems(EguiPrimaryContextPass, (draw_status, draw_menu).chain());
  }
}

#[allow(clippy::too_many_arguments)]
fn draw_status(
  mut contexts: EguiContexts,
  diagnostics: Res<DiagnosticsStore>,
  drops: Res<DropStore>,
  config: Res<SimulationConfig>,
  level: Res<LevelId>,
  outcome: Res<LevelOutcome>,
  host: Res<ScriptHost>,
  toggles: Res<SimulationToggles>,
) {
  let Ok(ctx) = contexts.ctx_mut() else { return };

  let fps = diagnostics
    .get(&FrameTimeDiagnosticsPlugin::FPS)
    .and_then(|fps| fps.smoothed())
    .unwrap_or(0.0);

  egui::Area::new(egui::Id::new("rain_status"))
    .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
    .interactable(false)
    .show(ctx, |ui| {
      ui.label(format!("{} | {fps:.0} fps", level.name));
      ui.label(format!("Drops: {}/{}", drops.len(), config.drops_max));
      if let Some(hint) = &outcome.hint {
        ui.label(hint);
      }
      if let Some(reason) = host.degraded() {
        ui.colored_label(egui::Color32::YELLOW, format!("Script: {reason}"));
      }
      if !toggles.physics {
        ui.colored_label(egui::Color32::LIGHT_RED, "Physics paused");
      }
      if !toggles.liquid_forces {
        ui.colored_label(egui::Color32::LIGHT_RED, "Liquid forces off");
      }
    });
}

/// The menu does not pause the simulation.
fn menu_title(won: bool) -> &'static str {
  if won { "Level complete" } else { "Menu" }
}

fn draw_menu(
  mut contexts: EguiContexts,
  mut menu: ResMut<MenuOpen>,
  state: Res<LevelState>,
  level: Res<LevelId>,
  mut loads: MessageWriter<LoadLevel>,
  mut exit: MessageWriter<AppExit>,
) {
  let won = *state == LevelState::Won;
  if !won && !menu.0 {
    return;
  }
  let Ok(ctx) = contexts.ctx_mut() else { return };

  egui::Window::new(menu_title(won))
    .collapsible(false)
    .resizable(false)
    .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
    .show(ctx, |ui| {
      ui.horizontal(|ui| {
        if won && ui.button("Next").clicked() {
          loads.write(LoadLevel::named(level.next()));
          menu.0 = false;
        }
        if ui.button("Restart").clicked() {
          loads.write(LoadLevel::named(level.name.clone()));
          menu.0 = false;
        }
        if ui.button("Quit").clicked() {
          exit.write(AppExit::Success);
        }
      });
    });
}
