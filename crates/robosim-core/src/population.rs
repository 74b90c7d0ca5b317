//! Population control: ID allocation, validated spawning and removal.
//!
//! [`Population`] owns the master random source. Every robot it spawns gets
//! its own seed drawn from that source, and every spawn position is drawn
//! from it too, so a given master seed replays the same world.

use std::collections::HashMap;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::arena::Arena;
use crate::entity::{Entity, EntityId, EntityTag, Robot, RobotKind};
use crate::error::{PlacementError, SimError};
use crate::geometry::{distance, Bounds};
use crate::sensor::TargetMask;

/// Default distance kept between a spawn point and an obstacle's edge.
pub const DEFAULT_CLEARANCE: f64 = 40.0;
/// Default cap on random placement candidates.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

// =============================================================================
// IdAllocator
// =============================================================================

/// Hands out monotonically increasing entity IDs, starting at 1.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Returns a fresh ID.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next += 1;
        id
    }

    /// Returns the ID the next call to [`allocate`](Self::allocate) will
    /// produce.
    #[must_use]
    pub const fn peek(&self) -> EntityId {
        EntityId::new(self.next)
    }
}

// =============================================================================
// Population
// =============================================================================

/// Spawns and removes entities on an [`Arena`].
#[derive(Debug, Clone)]
pub struct Population {
    ids: IdAllocator,
    rng: ChaCha8Rng,
    clearance: f64,
    max_attempts: u32,
    ordinals: HashMap<RobotKind, u32>,
}

impl Population {
    /// Creates population control with default placement rules.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_placement(seed, DEFAULT_CLEARANCE, DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates population control with custom placement rules.
    #[must_use]
    pub fn with_placement(seed: u64, clearance: f64, max_attempts: u32) -> Self {
        Self {
            ids: IdAllocator::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            clearance,
            max_attempts,
            ordinals: HashMap::new(),
        }
    }

    /// Returns the ID allocator.
    #[must_use]
    pub const fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Returns `true` if a point keeps clear of every obstacle's keep-out
    /// zone (`obstacle.radius + clearance`). Other kinds do not block.
    #[must_use]
    pub fn is_clear(&self, arena: &Arena, point: DVec2) -> bool {
        arena
            .entities()
            .iter()
            .filter(|e| TargetMask::OBSTACLE.matches(e.tag()))
            .all(|e| distance(point, e.position()) >= e.radius() + self.clearance)
    }

    /// Draws random points in the world rectangle until one is clear.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Exhausted`] after `max_attempts` misses.
    pub fn find_clear_position(&mut self, arena: &Arena) -> Result<DVec2, PlacementError> {
        let Bounds { width, height } = arena.bounds();
        for _ in 0..self.max_attempts {
            let candidate = DVec2::new(
                self.rng.gen::<f64>() * width,
                self.rng.gen::<f64>() * height,
            );
            if self.is_clear(arena, candidate) {
                return Ok(candidate);
            }
        }
        Err(PlacementError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// Spawns a robot of `kind` at a random clear position.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Placement`] if no clear position was found; the
    /// arena is left unchanged.
    pub fn spawn_robot(&mut self, arena: &mut Arena, kind: RobotKind) -> Result<EntityId, SimError> {
        let position = self.find_clear_position(arena)?;
        Ok(self.spawn_robot_at(arena, kind, position))
    }

    /// Spawns a robot of `kind` at `position` without placement checks.
    pub fn spawn_robot_at(&mut self, arena: &mut Arena, kind: RobotKind, position: DVec2) -> EntityId {
        let robot = self.new_robot(kind);
        let id = self.ids.allocate();
        debug!(%id, %kind, ordinal = robot.ordinal(), x = position.x, y = position.y, "spawned robot");
        arena.add(Entity::robot(id, position, robot));
        id
    }

    /// Adds a static item of `tag` at `position`.
    ///
    /// Robot tags spawn a robot of that kind at `position`.
    pub fn spawn_static(&mut self, arena: &mut Arena, tag: EntityTag, position: DVec2) -> EntityId {
        let id = self.ids.allocate();
        let entity = match tag {
            EntityTag::Obstacle => Entity::obstacle(id, position),
            EntityTag::MetalWall => Entity::metal_wall(id, position),
            EntityTag::Light => Entity::light(id, position),
            EntityTag::Robot(kind) => Entity::robot(id, position, self.new_robot(kind)),
        };
        debug!(%id, %tag, x = position.x, y = position.y, "spawned item");
        arena.add(entity);
        id
    }

    /// Adds an obstacle at `position`.
    pub fn spawn_obstacle(&mut self, arena: &mut Arena, position: DVec2) -> EntityId {
        self.spawn_static(arena, EntityTag::Obstacle, position)
    }

    /// Adds a metal wall at `position`.
    pub fn spawn_metal_wall(&mut self, arena: &mut Arena, position: DVec2) -> EntityId {
        self.spawn_static(arena, EntityTag::MetalWall, position)
    }

    /// Adds a light at `position`.
    pub fn spawn_light(&mut self, arena: &mut Arena, position: DVec2) -> EntityId {
        self.spawn_static(arena, EntityTag::Light, position)
    }

    /// Removes the first robot in registry order.
    pub fn remove_robot(&mut self, arena: &mut Arena) -> Option<Entity> {
        let removed = arena.remove_first_robot()?;
        debug!(id = %removed.id(), tag = %removed.tag(), "removed robot");
        Some(removed)
    }

    /// Draws a fresh seed for a restored robot.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Allocates a fresh ID for a restored entity.
    pub fn allocate_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Bumps the ordinal counter for `kind` so later spawns continue past
    /// `ordinal`.
    pub fn observe_ordinal(&mut self, kind: RobotKind, ordinal: u32) {
        let counter = self.ordinals.entry(kind).or_insert(0);
        *counter = (*counter).max(ordinal);
    }

    /// Keeps a restored robot's ordinal, or numbers it afresh when the
    /// record carried none (`0`).
    pub fn claim_ordinal(&mut self, kind: RobotKind, ordinal: u32) -> u32 {
        if ordinal == 0 {
            self.next_ordinal(kind)
        } else {
            self.observe_ordinal(kind, ordinal);
            ordinal
        }
    }

    fn next_ordinal(&mut self, kind: RobotKind) -> u32 {
        let counter = self.ordinals.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }

    fn new_robot(&mut self, kind: RobotKind) -> Robot {
        let seed = self.rng.gen();
        let ordinal = self.next_ordinal(kind);
        Robot::new(kind, seed).with_ordinal(ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod id_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic_from_one() {
            let mut ids = IdAllocator::default();
            assert_eq!(ids.peek(), EntityId::new(1));
            let a = ids.allocate();
            let b = ids.allocate();
            assert_eq!(a, EntityId::new(1));
            assert!(b > a);
        }
    }

    mod placement_tests {
        use super::*;
        use crate::entity::OBSTACLE_RADIUS;

        #[test]
        fn spawn_avoids_obstacles() {
            let mut arena = Arena::default();
            let mut population = Population::new(1);
            population.spawn_obstacle(&mut arena, DVec2::new(400.0, 300.0));
            for _ in 0..200 {
                population.spawn_robot(&mut arena, RobotKind::Simple).unwrap();
            }
            for (entity, _) in arena.robots() {
                assert!(entity.position().distance(DVec2::new(400.0, 300.0)) >= 65.0);
            }
        }

        #[test]
        fn only_obstacles_block() {
            let mut arena = Arena::default();
            let population = Population::new(1);
            arena.add(Entity::metal_wall(EntityId::new(1), DVec2::new(100.0, 100.0)));
            arena.add(Entity::light(EntityId::new(2), DVec2::new(200.0, 200.0)));
            assert!(population.is_clear(&arena, DVec2::new(100.0, 100.0)));
            assert!(population.is_clear(&arena, DVec2::new(200.0, 200.0)));
        }

        #[test]
        fn keep_out_boundary_is_inclusive() {
            let mut arena = Arena::default();
            let population = Population::new(1);
            arena.add(Entity::obstacle(EntityId::new(1), DVec2::new(100.0, 100.0)));
            assert!(population.is_clear(&arena, DVec2::new(165.0, 100.0)));
            assert!(!population.is_clear(&arena, DVec2::new(164.9, 100.0)));
        }

        #[test]
        fn dense_grid_spawns_only_in_pocket() {
            let pocket = DVec2::new(405.0, 315.0);
            let mut arena = Arena::default();
            let mut population = Population::new(9);
            // Spacing 90 leaves no point 65 clear of the grid.
            for i in 0..=9 {
                for j in 0..=7 {
                    let p = DVec2::new(f64::from(i) * 90.0, f64::from(j) * 90.0);
                    if p.distance(pocket) >= 150.0 {
                        population.spawn_obstacle(&mut arena, p);
                    }
                }
            }
            let obstacles: Vec<_> = arena.entities().iter().map(Entity::position).collect();

            for _ in 0..50 {
                population.spawn_robot(&mut arena, RobotKind::Simple).unwrap();
            }
            for (entity, _) in arena.robots() {
                let p = entity.position();
                assert!(p.distance(pocket) < 215.0, "{p} outside the pocket");
                for obstacle in &obstacles {
                    assert!(p.distance(*obstacle) >= OBSTACLE_RADIUS + DEFAULT_CLEARANCE);
                }
            }
        }

        #[test]
        fn blocked_world_exhausts_attempts() {
            let mut arena = Arena::new(Bounds::new(50.0, 50.0), Default::default());
            let mut population = Population::with_placement(1, 40.0, 25);
            population.spawn_obstacle(&mut arena, DVec2::new(25.0, 25.0));
            let err = population.spawn_robot(&mut arena, RobotKind::Echo).unwrap_err();
            assert!(matches!(
                err,
                SimError::Placement(PlacementError::Exhausted { attempts: 25 })
            ));
            assert_eq!(arena.robots().count(), 0);
        }
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn ordinals_count_per_kind() {
            let mut arena = Arena::default();
            let mut population = Population::new(3);
            population.spawn_robot(&mut arena, RobotKind::Simple).unwrap();
            population.spawn_robot(&mut arena, RobotKind::Echo).unwrap();
            population.spawn_robot(&mut arena, RobotKind::Simple).unwrap();

            let labels: Vec<_> = arena.robots().map(|(_, r)| r.label()).collect();
            assert_eq!(labels, vec!["SimpleRobot 1", "EchoRobot 1", "SimpleRobot 2"]);
        }

        #[test]
        fn observed_ordinals_are_skipped() {
            let mut arena = Arena::default();
            let mut population = Population::new(3);
            population.observe_ordinal(RobotKind::Magnet, 5);
            population.spawn_robot(&mut arena, RobotKind::Magnet).unwrap();
            let (_, robot) = arena.robots().next().unwrap();
            assert_eq!(robot.ordinal(), 6);
        }

        #[test]
        fn spawn_static_builds_requested_kind() {
            let mut arena = Arena::default();
            let mut population = Population::new(3);
            let id = population.spawn_static(&mut arena, EntityTag::Light, DVec2::new(5.0, 6.0));
            assert_eq!(arena.get(id).map(Entity::tag), Some(EntityTag::Light));
            let id = population.spawn_static(
                &mut arena,
                EntityTag::Robot(RobotKind::Swarm),
                DVec2::new(50.0, 60.0),
            );
            assert_eq!(
                arena.get(id).map(Entity::tag),
                Some(EntityTag::Robot(RobotKind::Swarm))
            );
        }

        #[test]
        fn remove_robot_takes_first() {
            let mut arena = Arena::default();
            let mut population = Population::new(3);
            population.spawn_obstacle(&mut arena, DVec2::new(10.0, 10.0));
            let first = population.spawn_robot(&mut arena, RobotKind::Whisker).unwrap();
            population.spawn_robot(&mut arena, RobotKind::Whisker).unwrap();

            let removed = population.remove_robot(&mut arena).unwrap();
            assert_eq!(removed.id(), first);
            assert_eq!(arena.len(), 2);
        }

        #[test]
        fn same_seed_same_world() {
            let build = || {
                let mut arena = Arena::default();
                let mut population = Population::new(42);
                for kind in RobotKind::ALL {
                    population.spawn_robot(&mut arena, kind).unwrap();
                }
                arena
                    .entities()
                    .iter()
                    .map(Entity::position)
                    .collect::<Vec<_>>()
            };
            assert_eq!(build(), build());
        }
    }
}
