pub(crate) mod camera;

use bevy::prelude::*;

pub struct CorePlugin;

impl Plugin for CorePlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<camera::PointerWorld>()
      .add_systems(Startup, camera::setup_camera)
      .add_systems(PreUpdate, camera::track_pointer);
  }
}
