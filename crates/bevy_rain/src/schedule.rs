//! Shared schedule labels for rain systems.
//!
//! Every simulation tick runs in [`FixedUpdate`]. The rain sets wrap Rapier's
//! own [`PhysicsSet`](bevy_rapier2d::prelude::PhysicsSet) so that a tick always
//! executes in this order:
//!
//! ```text
//! Intents → Forces → SyncBackend → StepSimulation → Writeback → Contacts → Spawn → Check
//! ```
//!
//! # Usage
//!
//! ```ignore
//! app.add_systems(FixedUpdate, my_system.in_set(RainSet::Check));
//! ```

use bevy::prelude::*;

/// System sets for one simulation tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RainSet {
  /// Clock advance, player intents, simulation toggles.
  Intents,
  /// Liquid constraint solve and force flush to the physics backend.
  Forces,
  /// Contact events forwarded to the level script.
  Contacts,
  /// Drop creation from sources and pointer painting.
  Spawn,
  /// Level outcome evaluation.
  Check,
}
