//! Single-press game keys: restart, next level, menu and debug toggles.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_console::ConsoleOpen;
use bevy_enhanced_input::prelude::*;
use bevy_rain::{LevelId, LevelState, LoadLevel, SimulationToggles};

use super::actions::*;
use super::{fired, on_off};
use crate::hud::MenuOpen;
use crate::visual_debug::DebugDraw;

/// Fires once per press of a held key.
#[derive(Default)]
struct Latch(bool);

impl Latch {
  fn rising(&mut self, now: bool) -> bool {
    let rose = now && !self.0;
    self.0 = now;
    rose
  }
}

#[derive(Default)]
pub(super) struct HotkeyLatches {
  restart: Latch,
  next: Latch,
  menu: Latch,
  debug: Latch,
  physics: Latch,
  liquid: Latch,
}

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub(super) fn handle_hotkeys(
  controllers: Query<&Actions<RainInput>>,
  states: (
    Query<&ActionState, With<Action<Restart>>>,
    Query<&ActionState, With<Action<NextLevel>>>,
    Query<&ActionState, With<Action<OpenMenu>>>,
    Query<&ActionState, With<Action<ToggleDebugDraw>>>,
    Query<&ActionState, With<Action<TogglePhysics>>>,
    Query<&ActionState, With<Action<ToggleLiquid>>>,
  ),
  console: Res<ConsoleOpen>,
  level: Res<LevelId>,
  state: Res<LevelState>,
  mut loads: MessageWriter<LoadLevel>,
  mut menu: ResMut<MenuOpen>,
  mut debug: ResMut<DebugDraw>,
  mut toggles: ResMut<SimulationToggles>,
  mut latches: Local<HotkeyLatches>,
) {
  let Ok(actions) = controllers.single() else {
    return;
  };
  let (restart, next, open_menu, debug_draw, physics, liquid) = states;

  // Escape closes the console first.
  if console.open {
    latches.menu.rising(fired(actions, &open_menu));
    return;
  }

  if latches.restart.rising(fired(actions, &restart)) && !level.name.is_empty() {
    info!("Restarting {}", level.name);
    loads.write(LoadLevel::named(level.name.clone()));
    menu.0 = false;
  }
  if latches.next.rising(fired(actions, &next)) && *state == LevelState::Won {
    loads.write(LoadLevel::named(level.next()));
    menu.0 = false;
  }
  if latches.menu.rising(fired(actions, &open_menu)) {
    menu.0 = !menu.0;
  }
  if latches.debug.rising(fired(actions, &debug_draw)) {
    debug.0 = !debug.0;
    let debug_on = debug.0;
    info!("Debug draw {}", on_off(debug_on));
  }
  if latches.physics.rising(fired(actions, &physics)) {
    toggles.physics = !toggles.physics;
    info!("Physics {}", on_off(toggles.physics));
  }
  if latches.liquid.rising(fired(actions, &liquid)) {
    toggles.liquid_forces = !toggles.liquid_forces;
    info!("Liquid forces {}", on_off(toggles.liquid_forces));
  }
}
