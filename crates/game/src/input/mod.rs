//! Keyboard and mouse bindings, turned into rain intents and game hotkeys.

pub mod actions;
mod bindings;
mod hotkeys;

pub use actions::RainInput;
use actions::{MoveCloud, MoveEmitter, Paint, Rain};
use bevy::prelude::*;
use bevy_console::ConsoleOpen;
use bevy_enhanced_input::prelude::*;
use bevy_rain::{Intent, IntentQueue};
pub use bindings::rain_input_actions;

use crate::core::camera::PointerWorld;

pub struct InputPlugin;

impl Plugin for InputPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_plugins(EnhancedInputPlugin)
      .add_input_context::<RainInput>()
      .add_systems(Startup, spawn_controller)
      .add_systems(Update, (forward_intents, hotkeys::handle_hotkeys));
  }
}

fn spawn_controller(mut commands: Commands) {
  commands.spawn((Name::new("Rain controller"), RainInput, rain_input_actions()));
}

/// Held intents, so that only changes reach the queue.
#[derive(Default)]
struct Held {
  cloud: Option<Intent>,
  emitter: Option<Intent>,
  rain: bool,
}

/// Maps a steering axis to the intent it holds.
fn steer(value: f32, negative: Intent, positive: Intent) -> Option<Intent> {
  if value < -0.5 {
    Some(negative)
  } else if value > 0.5 {
    Some(positive)
  } else {
    None
  }
}

fn hold(held: &mut Option<Intent>, next: Option<Intent>, queue: &mut IntentQueue) {
  if *held == next {
    return;
  }
  if let Some(previous) = held.take() {
    queue.release(previous);
  }
  if let Some(intent) = next {
    queue.press(intent);
  }
  *held = next;
}

fn axis<A: InputAction<Output = f32>>(
  actions: &Actions<RainInput>,
  values: &Query<(&Action<A>, &ActionState)>,
) -> f32 {
  actions
    .iter()
    .filter_map(|entity| values.get(entity).ok())
    .find(|(_, state)| matches!(state, ActionState::Fired | ActionState::Ongoing))
    .map_or(0.0, |(value, _)| **value)
}

pub(crate) fn fired<A: InputAction>(
  actions: &Actions<RainInput>,
  states: &Query<&ActionState, With<Action<A>>>,
) -> bool {
  actions
    .iter()
    .any(|entity| states.get(entity).is_ok_and(|s| *s == ActionState::Fired))
}

pub(crate) fn on_off(enabled: bool) -> &'static str {
  if enabled { "on" } else { "off" }
}

#[allow(clippy::too_many_arguments)]
fn forward_intents(
  controllers: Query<&Actions<RainInput>>,
  cloud: Query<(&Action<MoveCloud>, &ActionState)>,
  emitter: Query<(&Action<MoveEmitter>, &ActionState)>,
  rain: Query<&ActionState, With<Action<Rain>>>,
  paint: Query<&ActionState, With<Action<Paint>>>,
  pointer: Res<PointerWorld>,
  console: Res<ConsoleOpen>,
  mut queue: ResMut<IntentQueue>,
  mut held: Local<Held>,
) {
  if console.open {
    return;
  }
  let Ok(actions) = controllers.single() else {
    return;
  };

  let cloud_intent = steer(axis(actions, &cloud), Intent::Left, Intent::Right);
  hold(&mut held.cloud, cloud_intent, &mut queue);
  let emitter_intent = steer(axis(actions, &emitter), Intent::Down, Intent::Up);
  hold(&mut held.emitter, emitter_intent, &mut queue);

  let raining = fired(actions, &rain);
  if raining != held.rain {
    queue.push(Intent::Action, raining);
    held.rain = raining;
  }

  if fired(actions, &paint) {
    if let Some(at) = pointer.0 {
      queue.press(Intent::Paint { x: at.x, y: at.y });
    }
  }
}
