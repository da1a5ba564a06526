//! Simulated actors and their rigid bodies.
//!
//! Every actor is one entity carrying an [`Actor`] component next to its
//! Rapier body and collider, so despawning the entity destroys the body. The
//! physics backend refers back to actors through the entity index only.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::SimulationConfig;
use crate::drops::DropStore;
use crate::physics::PendingForce;
use crate::source::{LiquidSource, LiquidSources};

/// Half height of the cloud and emitter sensor boxes.
const SOURCE_HALF_HEIGHT: f32 = 8.0;

/// Crates grip hard so drops can push them without sliding them away.
const CRATE_FRICTION: f32 = 10.4;

/// Opaque actor handle handed to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// Closed set of actor kinds with their per-kind payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorKind {
  Drop,
  Cloud { width: f32 },
  Emitter { width: f32 },
  /// Fixed box: ground, walls, buckets.
  Static { size: Vec2 },
  /// Dynamic box.
  Other { size: Vec2 },
}

impl ActorKind {
  /// Lowercase name exposed to scripts.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Drop => "drop",
      Self::Cloud { .. } => "cloud",
      Self::Emitter { .. } => "emitter",
      Self::Static { .. } => "static",
      Self::Other { .. } => "other",
    }
  }

  /// Horizontal extent of the actor in world units.
  pub fn width(&self, drop_radius: f32) -> f32 {
    match *self {
      Self::Drop => drop_radius * 2.0,
      Self::Cloud { width } | Self::Emitter { width } => width,
      Self::Static { size } | Self::Other { size } => size.x,
    }
  }

  pub fn is_drop(&self) -> bool {
    matches!(self, Self::Drop)
  }
}

/// Back-reference from a physics body to its actor.
#[derive(Component, Debug, Clone)]
pub struct Actor {
  pub id: ActorId,
  pub kind: ActorKind,
  /// Optional script-assigned name, used by contact handlers.
  pub name: Option<String>,
}

/// Description of an actor to create, built by level scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSpec {
  pub kind: ActorKind,
  pub position: Vec2,
  pub rotation: f32,
  pub name: Option<String>,
}

impl ActorSpec {
  pub fn new(kind: ActorKind, position: Vec2) -> Self {
    Self {
      kind,
      position,
      rotation: 0.0,
      name: None,
    }
  }

  pub fn drop(position: Vec2) -> Self {
    Self::new(ActorKind::Drop, position)
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn rotated(mut self, radians: f32) -> Self {
    self.rotation = radians;
    self
  }
}

/// Allocator for [`ActorId`]s. Reset with the level.
#[derive(Resource, Default, Debug)]
pub struct ActorIds {
  next: u32,
}

impl ActorIds {
  pub fn allocate(&mut self) -> ActorId {
    let id = ActorId(self.next);
    self.next = self.next.wrapping_add(1);
    id
  }

  pub fn reset(&mut self) {
    self.next = 0;
  }
}

/// Creates actors with their physics bodies and registers them with the
/// drop store or the source slots.
#[derive(SystemParam)]
pub struct ActorSpawner<'w, 's> {
  commands: Commands<'w, 's>,
  ids: ResMut<'w, ActorIds>,
  drops: ResMut<'w, DropStore>,
  sources: ResMut<'w, LiquidSources>,
  config: Res<'w, SimulationConfig>,
}

impl ActorSpawner<'_, '_> {
  pub fn config(&self) -> &SimulationConfig {
    &self.config
  }

  pub fn sources(&self) -> &LiquidSources {
    &self.sources
  }

  /// Number of live drops, including ones spawned earlier this tick.
  pub fn drop_count(&self) -> usize {
    self.drops.len()
  }

  /// Spawns an actor from its description.
  pub fn spawn(&mut self, spec: &ActorSpec) -> Entity {
    let id = self.ids.allocate();
    let transform = Transform::from_translation(spec.position.extend(0.0))
      .with_rotation(Quat::from_rotation_z(spec.rotation));
    let entity = self
      .commands
      .spawn((
        Actor {
          id,
          kind: spec.kind,
          name: spec.name.clone(),
        },
        transform,
        GlobalTransform::from(transform),
        ActiveEvents::COLLISION_EVENTS,
      ))
      .id();

    let config = &*self.config;
    let mut entity_commands = self.commands.entity(entity);
    match spec.kind {
      ActorKind::Drop => {
        entity_commands.insert((
          RigidBody::Dynamic,
          Collider::ball(config.drop_radius),
          ColliderMassProperties::Mass(config.drop_mass),
          Friction::coefficient(0.1),
          Restitution::coefficient(0.1),
          Velocity::zero(),
          ExternalForce::default(),
          ExternalImpulse::default(),
          PendingForce::default(),
        ));
        self.drops.push(entity);
      }
      ActorKind::Cloud { width } | ActorKind::Emitter { width } => {
        entity_commands.insert((
          RigidBody::KinematicVelocityBased,
          Collider::cuboid(width / 2.0, SOURCE_HALF_HEIGHT),
          Sensor,
          Velocity::zero(),
          LiquidSource::default(),
        ));
        self.sources.register(entity, spec.kind);
      }
      ActorKind::Static { size } => {
        entity_commands.insert((
          RigidBody::Fixed,
          Collider::cuboid(size.x / 2.0, size.y / 2.0),
        ));
      }
      ActorKind::Other { size } => {
        entity_commands.insert((
          RigidBody::Dynamic,
          Collider::cuboid(size.x / 2.0, size.y / 2.0),
          ColliderMassProperties::Density(1.0),
          Friction::coefficient(CRATE_FRICTION),
          Velocity::zero(),
          ExternalForce::default(),
          ExternalImpulse::default(),
          PendingForce::default(),
        ));
      }
    }

    debug!("Spawned {} actor {:?} at {}", spec.kind.name(), id, spec.position);
    entity
  }

  /// Spawns a drop and queues its launch force for the next step.
  pub fn spawn_drop(&mut self, position: Vec2, launch: PendingForce) -> Entity {
    let entity = self.spawn(&ActorSpec::drop(position));
    self.commands.entity(entity).insert(launch);
    entity
  }
}
