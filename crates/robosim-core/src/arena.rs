//! Arena module: the authoritative entity registry and per-tick driver.
//!
//! The Arena owns every entity in insertion order. It provides:
//! - Entity storage with stable, insertion-ordered iteration
//! - Lookup and removal by [`EntityId`]
//! - The tick loop, in sequential or snapshot mode
//!
//! # Tick modes
//!
//! [`TickMode::Sequential`] updates entities one after another in registry
//! order. Each update sees the positions already committed earlier in the
//! same tick.
//!
//! [`TickMode::Snapshot`] freezes a [`WorldView`] at the start of the tick and
//! updates every entity against it in parallel with rayon. Because every
//! robot owns its random source, the result does not depend on thread
//! scheduling.
//!
//! # Fault isolation
//!
//! If an entity's update produces non-finite state, that entity is rolled
//! back to its pose from before the update, the fault is logged and
//! recorded in the [`TickReport`], and the tick carries on.
//!
//! # Example
//!
//! ```
//! use robosim_core::arena::Arena;
//! use robosim_core::entity::{Entity, EntityId};
//! use glam::DVec2;
//!
//! let mut arena = Arena::default();
//! arena.add(Entity::obstacle(EntityId::new(1), DVec2::new(100.0, 100.0)));
//! arena.add(Entity::light(EntityId::new(2), DVec2::new(300.0, 300.0)));
//!
//! let report = arena.tick();
//! assert_eq!(report.tick, 0);
//! assert_eq!(report.updated, 2);
//! assert_eq!(arena.current_tick(), 1);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::entity::{Entity, EntityId, EntityTag, Robot};
use crate::error::BehaviorError;
use crate::geometry::Bounds;
use crate::world_view::WorldView;

// =============================================================================
// Tick bookkeeping
// =============================================================================

/// How the arena schedules entity updates within a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// One entity at a time; later updaters see earlier moves.
    #[default]
    Sequential,
    /// All entities in parallel against a tick-start view.
    Snapshot,
}

/// One entity's failed update.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFault {
    /// Faulting entity.
    pub id: EntityId,
    /// Its kind.
    pub tag: EntityTag,
    /// What went wrong.
    pub error: BehaviorError,
}

/// Outcome of one [`Arena::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Index of the tick that ran (0 for the first).
    pub tick: u64,
    /// Number of entities that updated successfully.
    pub updated: usize,
    /// Isolated per-entity faults, in registry order.
    pub faults: Vec<EntityFault>,
}

impl TickReport {
    /// Returns `true` if every entity updated cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Ordered registry of every entity in the world, plus the world bounds.
///
/// The arena is created by the driver and passed by reference; there is no
/// global instance.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    bounds: Bounds,
    entities: Vec<Entity>,
    tick: u64,
    mode: TickMode,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new(bounds: Bounds, mode: TickMode) -> Self {
        Self {
            bounds,
            entities: Vec::new(),
            tick: 0,
            mode,
        }
    }

    /// Returns the world bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the scheduling mode.
    #[must_use]
    pub const fn mode(&self) -> TickMode {
        self.mode
    }

    /// Changes the scheduling mode for subsequent ticks.
    pub fn set_mode(&mut self, mode: TickMode) {
        self.mode = mode;
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Appends an entity. No validation is performed.
    pub fn add(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Removes the entity with `id`, returning it. `None` if absent.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Removes the first robot in registry order.
    pub fn remove_first_robot(&mut self) -> Option<Entity> {
        let index = self.entities.iter().position(Entity::is_robot)?;
        Some(self.entities.remove(index))
    }

    /// Replaces the whole registry.
    pub fn replace_all(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
    }

    /// Returns an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Returns a mutable entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Returns every entity in registry order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterates robots in registry order.
    pub fn robots(&self) -> impl Iterator<Item = (&Entity, &Robot)> + '_ {
        self.entities
            .iter()
            .filter_map(|e| e.as_robot().map(|robot| (e, robot)))
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Captures the current state as a read-only view.
    #[must_use]
    pub fn view(&self) -> WorldView {
        WorldView::capture(&self.entities, self.bounds)
    }

    /// Updates every entity once and advances the tick counter.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick;
        let results = match self.mode {
            TickMode::Sequential => self.update_sequential(),
            TickMode::Snapshot => self.update_snapshot(),
        };

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        for (entity, result) in self.entities.iter().zip(results) {
            match result {
                Ok(()) => report.updated += 1,
                Err(error) => {
                    warn!(tick, entity = %entity.id(), tag = %entity.tag(), %error, "entity update rolled back");
                    report.faults.push(EntityFault {
                        id: entity.id(),
                        tag: entity.tag(),
                        error,
                    });
                }
            }
        }

        self.tick += 1;
        trace!(
            tick,
            updated = report.updated,
            faults = report.faults.len(),
            "tick complete"
        );
        report
    }

    fn update_sequential(&mut self) -> Vec<Result<(), BehaviorError>> {
        let mut view = WorldView::capture(&self.entities, self.bounds);
        let mut results = Vec::with_capacity(self.entities.len());
        for (index, entity) in self.entities.iter_mut().enumerate() {
            let result = entity.update(&view);
            view.commit(index, entity.position());
            results.push(result);
        }
        results
    }

    fn update_snapshot(&mut self) -> Vec<Result<(), BehaviorError>> {
        let view = WorldView::capture(&self.entities, self.bounds);
        self.entities
            .par_iter_mut()
            .map(|entity| entity.update(&view))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
