//! Pathfinder robot: patrols a loop of waypoints.
//!
//! Sensors, speed changes and walls are all ignored. Each tick the robot
//! either steps toward its current waypoint or, if already within
//! [`ARRIVAL_THRESHOLD`], advances to the next waypoint without moving.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::BehaviorContext;
use crate::geometry::{bearing, distance};

/// Distance at which a waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f64 = 10.0;

/// A closed patrol route and the index of the waypoint being approached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    waypoints: Vec<DVec2>,
    current: usize,
}

impl Default for Patrol {
    /// The standard rectangle: (100,100) → (700,100) → (700,500) → (100,500).
    fn default() -> Self {
        Self::new(vec![
            DVec2::new(100.0, 100.0),
            DVec2::new(700.0, 100.0),
            DVec2::new(700.0, 500.0),
            DVec2::new(100.0, 500.0),
        ])
    }
}

impl Patrol {
    /// Creates a route starting at its first waypoint.
    #[must_use]
    pub fn new(waypoints: Vec<DVec2>) -> Self {
        Self {
            waypoints,
            current: 0,
        }
    }

    /// Creates a route resuming at waypoint `current`.
    ///
    /// Returns `None` if `current` is out of range for a non-empty route.
    /// An empty route only accepts index 0.
    #[must_use]
    pub fn resume(waypoints: Vec<DVec2>, current: usize) -> Option<Self> {
        let valid = if waypoints.is_empty() {
            current == 0
        } else {
            current < waypoints.len()
        };
        valid.then_some(Self { waypoints, current })
    }

    /// Returns the route.
    #[must_use]
    pub fn waypoints(&self) -> &[DVec2] {
        &self.waypoints
    }

    /// Returns the index of the waypoint being approached.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Returns the waypoint being approached, if the route is not empty.
    #[must_use]
    pub fn target(&self) -> Option<DVec2> {
        self.waypoints.get(self.current).copied()
    }

    pub(super) fn step(&mut self, ctx: &mut BehaviorContext<'_>) {
        let Some(target) = self.target() else {
            return;
        };
        let here = ctx.position();
        if distance(here, target) < ARRIVAL_THRESHOLD {
            self.current = (self.current + 1) % self.waypoints.len();
        } else {
            ctx.motion.direction = bearing(here, target);
            ctx.advance();
        }
    }
}
