use bevy::{camera::ScalingMode, prelude::*, window::PrimaryWindow};

use crate::config::ConfigLoaded;

/// Marker component for the game camera
#[derive(Component)]
pub struct GameCamera;

/// Cursor position in world coordinates, `None` while it is outside the
/// window.
#[derive(Resource, Default, Debug)]
pub struct PointerWorld(pub Option<Vec2>);

/// Fixed orthographic camera over the level.
pub fn setup_camera(mut commands: Commands, config: Res<ConfigLoaded>) {
  let [x, y] = config.camera.center;
  commands.spawn((
    GameCamera,
    Camera2d,
    Camera {
      order: 0,
      clear_color: ClearColorConfig::Custom(Color::srgb(0.06, 0.07, 0.1)),
      ..default()
    },
    Projection::Orthographic(OrthographicProjection {
      near: -1000.0,
      far: 1000.0,
      scale: 1.0,
      viewport_origin: Vec2::new(0.5, 0.5),
      scaling_mode: ScalingMode::AutoMin {
        min_width: config.camera.viewport_width,
        min_height: config.camera.viewport_height,
      },
      area: Rect::default(),
    }),
    Transform::from_xyz(x, y, 0.0),
  ));
}

pub fn track_pointer(
  windows: Query<&Window, With<PrimaryWindow>>,
  cameras: Query<(&Camera, &GlobalTransform), With<GameCamera>>,
  mut pointer: ResMut<PointerWorld>,
) {
  let world = windows
    .single()
    .ok()
    .and_then(Window::cursor_position)
    .zip(cameras.single().ok())
    .and_then(|(cursor, (camera, transform))| camera.viewport_to_world_2d(transform, cursor).ok());
  if pointer.0 != world {
    pointer.0 = world;
  }
}
