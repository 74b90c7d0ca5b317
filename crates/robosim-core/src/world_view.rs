//! `WorldView` provides tick-scoped, read-only access to arena state for
//! sensors and behavior rules.
//!
//! A view is captured from the arena's registry at the start of a tick. It
//! holds one [`Presence`] per entity, in registry order, plus the world
//! bounds. Behavior rules never see the registry itself; they query the view.
//!
//! # Sequential vs snapshot ticks
//!
//! In [`TickMode::Sequential`](crate::arena::TickMode::Sequential) the arena
//! commits each entity's new position back into the view as soon as its
//! update finishes, so entity `k` observes the moves made by entities
//! `0..k` in the same tick. In
//! [`TickMode::Snapshot`](crate::arena::TickMode::Snapshot) the view stays
//! frozen for the whole tick.
//!
//! # Example
//!
//! ```
//! use robosim_core::entity::{Entity, EntityId, EntityTag};
//! use robosim_core::geometry::Bounds;
//! use robosim_core::sensor::TargetMask;
//! use robosim_core::world_view::WorldView;
//! use glam::DVec2;
//!
//! let entities = vec![
//!     Entity::obstacle(EntityId::new(1), DVec2::new(100.0, 100.0)),
//!     Entity::light(EntityId::new(2), DVec2::new(400.0, 300.0)),
//! ];
//! let view = WorldView::capture(&entities, Bounds::default());
//!
//! let nearest = view
//!     .nearest(DVec2::new(390.0, 290.0), None, TargetMask::LIGHT, None)
//!     .unwrap();
//! assert_eq!(nearest.tag, EntityTag::Light);
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityTag};
use crate::geometry::{distance, Bounds};
use crate::sensor::TargetMask;

// =============================================================================
// Presence
// =============================================================================

/// Footprint of one entity as seen by sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    /// Entity identity.
    pub id: EntityId,
    /// Entity kind.
    pub tag: EntityTag,
    /// Center.
    pub position: DVec2,
    /// Radius.
    pub radius: f64,
}

impl Presence {
    /// Center-to-center distance from `point`.
    #[must_use]
    pub fn distance_to(&self, point: DVec2) -> f64 {
        distance(point, self.position)
    }
}

// =============================================================================
// WorldView
// =============================================================================

/// Read-only snapshot of every entity's presence plus the world bounds.
///
/// The view owns its data, so it can be shared across rayon workers while
/// the registry itself is borrowed mutably.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldView {
    presences: Vec<Presence>,
    bounds: Bounds,
}

impl WorldView {
    /// Captures the presences of `entities`, preserving their order.
    #[must_use]
    pub fn capture(entities: &[Entity], bounds: Bounds) -> Self {
        Self {
            presences: entities.iter().map(Entity::presence).collect(),
            bounds,
        }
    }

    /// Returns the world bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns every presence in registry order.
    #[must_use]
    pub fn presences(&self) -> &[Presence] {
        &self.presences
    }

    /// Returns the number of entities in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presences.len()
    }

    /// Returns `true` if the view holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presences.is_empty()
    }

    /// Looks up an entity's presence by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Presence> {
        self.presences.iter().find(|p| p.id == id)
    }

    /// Iterates presences matching `mask`, skipping `exclude`.
    pub fn matching(
        &self,
        exclude: Option<EntityId>,
        mask: TargetMask,
    ) -> impl Iterator<Item = &Presence> + '_ {
        self.presences
            .iter()
            .filter(move |p| Some(p.id) != exclude && mask.matches(p.tag))
    }

    /// Finds the presence nearest to `from` among those matching `mask`.
    ///
    /// Only candidates strictly closer than `max_range` qualify (no limit when
    /// `None`). Ties go to the earliest entity in registry order.
    #[must_use]
    pub fn nearest(
        &self,
        from: DVec2,
        exclude: Option<EntityId>,
        mask: TargetMask,
        max_range: Option<f64>,
    ) -> Option<&Presence> {
        let mut best_distance = max_range.unwrap_or(f64::INFINITY);
        let mut best = None;
        for presence in self.matching(exclude, mask) {
            let d = presence.distance_to(from);
            if d < best_distance {
                best_distance = d;
                best = Some(presence);
            }
        }
        best
    }

    /// Iterates presences matching `mask` strictly closer than `range` to
    /// `from`, skipping `exclude`.
    pub fn within(
        &self,
        from: DVec2,
        exclude: Option<EntityId>,
        mask: TargetMask,
        range: f64,
    ) -> impl Iterator<Item = &Presence> + '_ {
        self.matching(exclude, mask)
            .filter(move |p| p.distance_to(from) < range)
    }

    /// Overwrites the position recorded at registry slot `index`.
    ///
    /// Used by sequential ticks to publish a moved entity to later updaters.
    pub(crate) fn commit(&mut self, index: usize, position: DVec2) {
        if let Some(presence) = self.presences.get_mut(index) {
            presence.position = position;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
