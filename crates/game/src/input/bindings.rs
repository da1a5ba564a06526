use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::actions::*;

pub fn rain_input_actions() -> impl Bundle {
  actions!(RainInput[
      (
          Action::<MoveCloud>::new(),
          Bindings::spawn(Bidirectional::left_right_arrow()),
      ),
      (
          Action::<MoveEmitter>::new(),
          Bindings::spawn(Bidirectional::up_down_arrow()),
      ),
      (
          Action::<Rain>::new(),
          bindings![KeyCode::Space],
      ),
      (
          Action::<Paint>::new(),
          bindings![MouseButton::Left],
      ),
      (
          Action::<Restart>::new(),
          bindings![KeyCode::KeyR],
      ),
      (
          Action::<NextLevel>::new(),
          bindings![KeyCode::KeyN],
      ),
      (
          Action::<OpenMenu>::new(),
          bindings![KeyCode::Escape],
      ),
      (
          Action::<ToggleDebugDraw>::new(),
          bindings![KeyCode::F4, KeyCode::KeyD],
      ),
      (
          Action::<TogglePhysics>::new(),
          bindings![KeyCode::F5, KeyCode::KeyP],
      ),
      (
          Action::<ToggleLiquid>::new(),
          bindings![KeyCode::F6, KeyCode::KeyL],
      ),
  ])
}
