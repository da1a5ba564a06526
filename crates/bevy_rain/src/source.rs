//! Player-controlled liquid sources: the cloud and the emitter.

use bevy::prelude::*;

use crate::actor::ActorKind;

/// Directional intent of a source.
///
/// The discriminants match the values the level art keys its animation on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceDirection {
  #[default]
  Idle = 0,
  Left = 1,
  Right = 2,
  Raining = -1,
}

/// Marker and intent state of a cloud or emitter.
#[derive(Component, Debug, Default)]
pub struct LiquidSource {
  pub direction: SourceDirection,
}

/// Singleton slots for the active cloud and emitter of a level.
///
/// Lookup only: the entities belong to the level and are despawned with it.
#[derive(Resource, Default, Debug)]
pub struct LiquidSources {
  pub cloud: Option<Entity>,
  pub emitter: Option<Entity>,
}

impl LiquidSources {
  pub(crate) fn register(&mut self, entity: Entity, kind: ActorKind) {
    let slot = match kind {
      ActorKind::Cloud { .. } => &mut self.cloud,
      ActorKind::Emitter { .. } => &mut self.emitter,
      _ => return,
    };
    if let Some(previous) = slot.replace(entity) {
      warn!(
        "Level added a second {}; {:?} replaces {:?}",
        kind.name(),
        entity,
        previous
      );
    }
  }

  /// True when the level has neither a cloud nor an emitter.
  pub fn is_empty(&self) -> bool {
    self.cloud.is_none() && self.emitter.is_none()
  }

  pub fn clear(&mut self) {
    self.cloud = None;
    self.emitter = None;
  }
}
