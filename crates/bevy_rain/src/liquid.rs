//! Liquid constraint solver.
//!
//! Drops within `radius` of each other are tied by a damped spring: pairs
//! farther apart than `rest_distance` attract, closer pairs repel, and the
//! relative velocity along the pair axis is damped. The result is added to
//! each drop's [`PendingForce`] before the physics step, so the integrator
//! stays the only thing that moves bodies.
//!
//! Neighbors are found through a uniform grid whose cells are one interaction
//! radius wide, so only the 3×3 block around a drop has to be scanned.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

use crate::config::{LiquidParams, SimulationConfig};
use crate::drops::DropStore;
use crate::physics::PendingForce;

/// Tick rate the liquid constants are tuned for.
const REFERENCE_HZ: f32 = 60.0;

/// Squared distance under which two drops count as coincident.
const COINCIDENT_EPSILON_SQ: f32 = 1e-8;

/// Uniform hash grid over drop indices.
pub struct NeighborGrid {
  cell_size: f32,
  cells: HashMap<IVec2, Vec<usize>>,
}

impl NeighborGrid {
  /// Buckets every finite position. Indices within a cell stay ascending.
  pub fn build(positions: &[Vec2], cell_size: f32) -> Self {
    let mut cells: HashMap<IVec2, Vec<usize>> = HashMap::new();
    for (index, position) in positions.iter().enumerate() {
      if !position.is_finite() {
        continue;
      }
      cells
        .entry(Self::cell_of(*position, cell_size))
        .or_default()
        .push(index);
    }
    Self { cell_size, cells }
  }

  fn cell_of(position: Vec2, cell_size: f32) -> IVec2 {
    (position / cell_size).floor().as_ivec2()
  }

  /// Calls `visit` for every index in the 3×3 cell block around `position`.
  pub fn for_each_candidate(&self, position: Vec2, mut visit: impl FnMut(usize)) {
    let center = Self::cell_of(position, self.cell_size);
    for dy in -1..=1 {
      for dx in -1..=1 {
        if let Some(bucket) = self.cells.get(&(center + IVec2::new(dx, dy))) {
          for &index in bucket {
            visit(index);
          }
        }
      }
    }
  }
}

/// Force on drop `i` from its pair with drop `j`, or `None` when the pair
/// does not interact.
fn pair_force(
  delta: Vec2,
  relative_velocity: Vec2,
  params: &LiquidParams,
  dt_scale: f32,
) -> Option<Vec2> {
  let distance_sq = delta.length_squared();
  if distance_sq >= params.radius * params.radius || distance_sq < COINCIDENT_EPSILON_SQ {
    return None;
  }

  let distance = distance_sq.sqrt();
  let normal = delta / distance;
  let spring = params.stiffness * (distance - params.rest_distance);
  let damping = params.viscosity * relative_velocity.dot(normal) * (1.0 - distance / params.radius);
  let magnitude =
    ((spring + damping) * dt_scale).clamp(-params.max_pair_force, params.max_pair_force);
  let force = normal * magnitude;

  force.is_finite().then_some(force)
}

/// Computes the liquid force on every drop.
///
/// `positions` and `velocities` are parallel slices. Pairs are visited once,
/// so the returned forces sum to zero.
pub fn liquid_forces(
  positions: &[Vec2],
  velocities: &[Vec2],
  params: &LiquidParams,
  dt: f32,
) -> Vec<Vec2> {
  let count = positions.len().min(velocities.len());
  let mut forces = vec![Vec2::ZERO; count];
  if count < 2 || params.radius <= 0.0 || dt <= 0.0 || !dt.is_finite() {
    return forces;
  }

  let dt_scale = dt * REFERENCE_HZ;
  let grid = NeighborGrid::build(&positions[..count], params.radius);

  for i in 0..count {
    let position = positions[i];
    if !position.is_finite() {
      continue;
    }
    grid.for_each_candidate(position, |j| {
      if j <= i {
        return;
      }
      let relative_velocity = velocities[j] - velocities[i];
      if let Some(force) = pair_force(positions[j] - position, relative_velocity, params, dt_scale)
      {
        forces[i] += force;
        forces[j] -= force;
      }
    });
  }

  forces
}

/// Scratch buffers reused between ticks.
#[derive(Default)]
pub struct LiquidScratch {
  entities: Vec<Entity>,
  positions: Vec<Vec2>,
  velocities: Vec<Vec2>,
}

/// Applies the liquid constraint to every drop in the store.
pub fn apply_liquid_constraint(
  config: Res<SimulationConfig>,
  store: Res<DropStore>,
  mut drops: Query<(&Transform, &Velocity, &mut PendingForce)>,
  mut scratch: Local<LiquidScratch>,
) {
  if store.len() < 2 {
    return;
  }

  let LiquidScratch {
    entities,
    positions,
    velocities,
  } = &mut *scratch;
  entities.clear();
  positions.clear();
  velocities.clear();

  for entity in store.iter() {
    // Drops spawned this tick have no body yet.
    let Ok((transform, velocity, _)) = drops.get(entity) else {
      continue;
    };
    entities.push(entity);
    positions.push(transform.translation.truncate());
    velocities.push(velocity.linvel);
  }

  let forces = liquid_forces(
    positions,
    velocities,
    &config.liquid_params(),
    config.tick_dt(),
  );

  for (entity, force) in entities.iter().zip(forces) {
    if force == Vec2::ZERO {
      continue;
    }
    if let Ok((_, _, mut pending)) = drops.get_mut(*entity) {
      pending.add_force(force);
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::{Rng, SeedableRng};

  use super::*;

  const DT: f32 = 1.0 / 60.0;

  fn params() -> LiquidParams {
    LiquidParams::default()
  }

  fn brute_force(positions: &[Vec2], velocities: &[Vec2], params: &LiquidParams) -> Vec<Vec2> {
    let mut forces = vec![Vec2::ZERO; positions.len()];
    for i in 0..positions.len() {
      for j in (i + 1)..positions.len() {
        if let Some(force) = pair_force(
          positions[j] - positions[i],
          velocities[j] - velocities[i],
          params,
          DT * REFERENCE_HZ,
        ) {
          forces[i] += force;
          forces[j] -= force;
        }
      }
    }
    forces
  }

  #[test]
  fn zero_or_one_drop_is_a_no_op() {
    assert!(liquid_forces(&[], &[], &params(), DT).is_empty());
    assert_eq!(
      liquid_forces(&[Vec2::ONE], &[Vec2::ZERO], &params(), DT),
      vec![Vec2::ZERO]
    );
  }

  #[test]
  fn coincident_drops_get_no_force() {
    let positions = [Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)];
    let forces = liquid_forces(&positions, &[Vec2::X, -Vec2::X], &params(), DT);
    assert_eq!(forces, vec![Vec2::ZERO, Vec2::ZERO]);
    assert!(forces.iter().all(|f| f.is_finite()));
  }

  #[test]
  fn far_pair_attracts_near_pair_repels() {
    let p = params();
    let far = [Vec2::ZERO, Vec2::new(p.rest_distance + 3.0, 0.0)];
    let forces = liquid_forces(&far, &[Vec2::ZERO; 2], &p, DT);
    assert!(forces[0].x > 0.0, "left drop pulled right: {:?}", forces);
    assert!(forces[1].x < 0.0);

    let near = [Vec2::ZERO, Vec2::new(p.rest_distance - 3.0, 0.0)];
    let forces = liquid_forces(&near, &[Vec2::ZERO; 2], &p, DT);
    assert!(forces[0].x < 0.0, "left drop pushed left: {:?}", forces);
    assert!(forces[1].x > 0.0);
  }

  #[test]
  fn pairs_outside_radius_do_not_interact() {
    let p = params();
    let positions = [Vec2::ZERO, Vec2::new(p.radius + 0.5, 0.0)];
    let forces = liquid_forces(&positions, &[Vec2::ZERO; 2], &p, DT);
    assert_eq!(forces, vec![Vec2::ZERO, Vec2::ZERO]);
  }

  #[test]
  fn approaching_drops_are_damped() {
    let p = LiquidParams {
      stiffness: 0.0,
      ..params()
    };
    let positions = [Vec2::ZERO, Vec2::new(5.0, 0.0)];
    let velocities = [Vec2::new(10.0, 0.0), Vec2::new(-10.0, 0.0)];
    let forces = liquid_forces(&positions, &velocities, &p, DT);
    assert!(forces[0].x < 0.0);
    assert!(forces[1].x > 0.0);
  }

  #[test]
  fn forces_are_momentum_conserving_and_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let p = params();
    let positions: Vec<Vec2> = (0..300)
      .map(|_| Vec2::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0)))
      .collect();
    let velocities: Vec<Vec2> = (0..300)
      .map(|_| Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)))
      .collect();

    let grid = liquid_forces(&positions, &velocities, &p, DT);
    let naive = brute_force(&positions, &velocities, &p);

    let total: Vec2 = grid.iter().copied().sum();
    assert!(total.length() < 1e-2, "net force {total}");
    for (a, b) in grid.iter().zip(&naive) {
      assert!((*a - *b).length() < 1e-3, "grid {a} vs naive {b}");
    }
  }

  #[test]
  fn non_finite_input_is_ignored() {
    let positions = [Vec2::new(f32::NAN, 0.0), Vec2::ZERO, Vec2::new(8.0, 0.0)];
    let forces = liquid_forces(&positions, &[Vec2::ZERO; 3], &params(), DT);
    assert_eq!(forces[0], Vec2::ZERO);
    assert!(forces.iter().all(|f| f.is_finite()));
    assert!(forces[1].x > 0.0);
  }

  #[test]
  fn grid_candidates_cover_neighboring_cells() {
    let positions = [Vec2::new(0.5, 0.5), Vec2::new(-0.5, -0.5), Vec2::new(30.0, 30.0)];
    let grid = NeighborGrid::build(&positions, 1.0);
    let mut seen = Vec::new();
    grid.for_each_candidate(positions[0], |j| seen.push(j));
    seen.sort();
    assert_eq!(seen, vec![0, 1]);
  }
}
