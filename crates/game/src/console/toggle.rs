//! `/` opens and closes the console, Escape only closes it.
//!
//! Both go through bevy_console's own toggle key so it keeps handling focus.

use bevy::ecs::message::MessageWriter;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use bevy_console::ConsoleOpen;
use bevy_egui::{EguiContexts, egui};

pub fn handle_console_toggle(
  keys: Res<ButtonInput<KeyCode>>,
  console_open: Res<ConsoleOpen>,
  mut contexts: EguiContexts,
  mut keyboard_events: MessageWriter<KeyboardInput>,
) {
  let (close, key) = if keys.just_pressed(KeyCode::Escape) {
    (true, egui::Key::Escape)
  } else if keys.just_pressed(KeyCode::Slash) {
    (false, egui::Key::Slash)
  } else {
    return;
  };
  if close && !console_open.open {
    return;
  }

  // Keep the key out of the input line.
  if console_open.open {
    if let Ok(ctx) = contexts.ctx_mut() {
      ctx.input_mut(|i| {
        i.consume_key(egui::Modifiers::NONE, key);
      });
    }
  }

  keyboard_events.write(KeyboardInput {
    key_code: KeyCode::F12,
    logical_key: Key::F12,
    state: ButtonState::Pressed,
    text: None,
    repeat: false,
    window: Entity::PLACEHOLDER,
  });
}
