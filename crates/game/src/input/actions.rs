use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

/// Input context of the rain controller entity.
#[derive(Component)]
pub struct RainInput;

/// Cloud steering, -1 left to 1 right.
#[derive(Debug, InputAction)]
#[action_output(f32)]
pub struct MoveCloud;

/// Emitter steering, -1 down to 1 up.
#[derive(Debug, InputAction)]
#[action_output(f32)]
pub struct MoveEmitter;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Rain;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Paint;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Restart;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct NextLevel;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct OpenMenu;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct ToggleDebugDraw;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct TogglePhysics;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct ToggleLiquid;
