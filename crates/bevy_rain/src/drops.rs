//! Drop particle store.

use bevy::prelude::*;

/// Live drops in spawn order.
///
/// The order is stable for the lifetime of a level and is the order scripts
/// see in `onCheck`. The store only grows during a level; a level reset
/// clears it together with the entities.
#[derive(Resource, Default, Debug)]
pub struct DropStore {
  entities: Vec<Entity>,
}

impl DropStore {
  pub fn len(&self) -> usize {
    self.entities.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entities.is_empty()
  }

  pub fn push(&mut self, entity: Entity) {
    self.entities.push(entity);
  }

  pub fn entities(&self) -> &[Entity] {
    &self.entities
  }

  pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
    self.entities.iter().copied()
  }

  /// Forgets every drop and returns them for despawning.
  pub fn drain(&mut self) -> Vec<Entity> {
    std::mem::take(&mut self.entities)
  }
}
