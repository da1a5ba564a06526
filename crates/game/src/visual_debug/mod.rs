use bevy::prelude::*;
use bevy_rain::{DropStore, SimulationConfig};
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::render::{DebugRenderContext, RapierDebugRenderPlugin};

/// Debug drawing switch, toggled with F4 or D.
#[derive(Resource, Default)]
pub struct DebugDraw(pub bool);

pub struct VisualDebugPlugin;

impl Plugin for VisualDebugPlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<DebugDraw>()
      .add_plugins(RapierDebugRenderPlugin::default().disabled())
      .add_systems(Update, (sync_rapier_debug, draw_debug_vectors));
  }
}

fn sync_rapier_debug(debug: Res<DebugDraw>, mut context: ResMut<DebugRenderContext>) {
  if debug.is_changed() && context.enabled != debug.0 {
    context.enabled = debug.0;
  }
}

/// Velocity of every drop (yellow) and the liquid interaction radius of the
/// first one (cyan).
fn draw_debug_vectors(
  mut gizmos: Gizmos,
  debug: Res<DebugDraw>,
  config: Res<SimulationConfig>,
  store: Res<DropStore>,
  drops: Query<(&Transform, &Velocity)>,
) {
  const VELOCITY_SCALE: f32 = 0.1;

  if !debug.0 {
    return;
  }

  for (transform, velocity) in store.iter().filter_map(|e| drops.get(e).ok()) {
    if velocity.linvel.length_squared() > 0.01 {
      let from = transform.translation.truncate();
      gizmos.line_2d(
        from,
        from + velocity.linvel * VELOCITY_SCALE,
        Color::srgb(1.0, 1.0, 0.0),
      );
    }
  }

  if let Some((transform, _)) = store.iter().next().and_then(|e| drops.get(e).ok()) {
    gizmos.circle_2d(
      Isometry2d::from_translation(transform.translation.truncate()),
      config.liquid_params().radius,
      Color::srgb(0.0, 1.0, 1.0),
    );
  }
}
