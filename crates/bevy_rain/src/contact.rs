//! Contact bridge: Rapier collision events to script callbacks.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionEvent, Velocity};

use crate::actor::{Actor, ActorId};
use crate::config::SimulationConfig;
use crate::script::{ActorView, ScriptHost};

/// Whether two actors started or stopped touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
  Begin,
  End,
}

/// A begin or end contact between two actors, valid for the current tick.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
  pub phase: ContactPhase,
  pub a: Entity,
  pub b: Entity,
  pub a_id: ActorId,
  pub b_id: ActorId,
}

/// Forwards this tick's collisions to the level script.
pub fn dispatch_contacts(
  mut collisions: MessageReader<CollisionEvent>,
  mut contacts: MessageWriter<ContactEvent>,
  mut host: ResMut<ScriptHost>,
  config: Res<SimulationConfig>,
  actors: Query<(&Actor, &Transform, Option<&Velocity>)>,
) {
  for collision in collisions.read() {
    let (a, b, phase) = match *collision {
      CollisionEvent::Started(a, b, _) => (a, b, ContactPhase::Begin),
      CollisionEvent::Stopped(a, b, _) => (a, b, ContactPhase::End),
    };
    // Either side may have been despawned this tick.
    let (Ok(first), Ok(second)) = (actors.get(a), actors.get(b)) else {
      continue;
    };

    contacts.write(ContactEvent {
      phase,
      a,
      b,
      a_id: first.0.id,
      b_id: second.0.id,
    });

    let view = |(actor, transform, velocity): (&Actor, &Transform, Option<&Velocity>)| {
      ActorView::new(
        actor,
        transform.translation.truncate(),
        velocity.map_or(Vec2::ZERO, |v| v.linvel),
        config.drop_radius,
      )
    };
    if let Err(err) = host.call_contact(phase, view(first), view(second)) {
      error!("Contact {phase:?} between {:?} and {:?}: {err}", first.0.id, second.0.id);
    }
  }
}
