//! Gizmo drawing of every actor.
//!
//! The level has no sprites: drops are filled circles shaded by speed,
//! boxes are outlined and sources are drawn as rounded bars.

use bevy::prelude::*;
use bevy_rain::{Actor, ActorKind, LiquidSource, SimulationConfig, SourceDirection};
use bevy_rapier2d::prelude::Velocity;

const SLOW_DROP: Color = Color::srgb(0.25, 0.5, 0.95);
const FAST_DROP: Color = Color::srgb(0.75, 0.9, 1.0);
/// Speed at which a drop is drawn fully in the fast colour.
const FAST_SPEED: f32 = 300.0;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
  fn build(&self, app: &mut App) {
    app.add_systems(Update, (draw_drops, draw_bodies, draw_sources));
  }
}

/// Blend factor between the slow and the fast drop colour.
fn speed_shade(speed: f32) -> f32 {
  (speed / FAST_SPEED).clamp(0.0, 1.0)
}

fn draw_drops(
  mut gizmos: Gizmos,
  config: Res<SimulationConfig>,
  drops: Query<(&Actor, &Transform, &Velocity)>,
) {
  for (actor, transform, velocity) in &drops {
    if !actor.kind.is_drop() {
      continue;
    }
    let color = SLOW_DROP.mix(&FAST_DROP, speed_shade(velocity.linvel.length()));
    gizmos
      .circle_2d(
        Isometry2d::from_translation(transform.translation.truncate()),
        config.drop_radius,
        color,
      )
      .resolution(8);
  }
}

fn draw_bodies(mut gizmos: Gizmos, bodies: Query<(&Actor, &Transform)>) {
  for (actor, transform) in &bodies {
    let (size, color) = match actor.kind {
      ActorKind::Static { size } => (size, Color::srgb(0.55, 0.5, 0.45)),
      ActorKind::Other { size } => (size, Color::srgb(0.8, 0.6, 0.3)),
      _ => continue,
    };
    let isometry = Isometry2d::new(
      transform.translation.truncate(),
      Rot2::radians(transform.rotation.to_euler(EulerRot::ZYX).0),
    );
    gizmos.rect_2d(isometry, size, color);
  }
}

fn draw_sources(mut gizmos: Gizmos, sources: Query<(&Actor, &Transform, &LiquidSource)>) {
  for (actor, transform, source) in &sources {
    let width = match actor.kind {
      ActorKind::Cloud { width } | ActorKind::Emitter { width } => width,
      _ => continue,
    };
    let color = match source.direction {
      SourceDirection::Raining => Color::srgb(0.6, 0.7, 0.9),
      _ => Color::srgb(0.85, 0.85, 0.9),
    };
    gizmos.rounded_rect_2d(
      Isometry2d::from_translation(transform.translation.truncate()),
      Vec2::new(width, 16.0),
      color,
    );
  }
}
