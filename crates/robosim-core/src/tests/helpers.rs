//! Test helper functions for setting up simulations and robots.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::DVec2;

use crate::arena::TickMode;
use crate::config::SimConfig;
use crate::entity::{EntityId, EntityTag, Motion, RobotKind};
use crate::simulation::Simulation;

// =============================================================================
// Scenario Setup
// =============================================================================

/// Creates a simulation with the stock layout, a light in the middle and one
/// randomly placed robot of every kind.
///
/// # Returns
///
/// The simulation and the robot IDs in spawn order.
pub fn populated_sim(seed: u64, mode: TickMode) -> (Simulation, Vec<EntityId>) {
    let config = SimConfig {
        tick_mode: mode,
        ..SimConfig::with_seed(seed)
    };
    let mut sim = Simulation::with_default_layout(config).unwrap();
    sim.add_light(DVec2::new(400.0, 300.0));
    let ids = RobotKind::ALL
        .iter()
        .map(|&kind| sim.spawn_robot(kind).unwrap())
        .collect();
    (sim, ids)
}

/// Spawns a robot with a fixed pose and speed, bypassing random placement.
pub fn spawn_posed_robot(
    sim: &mut Simulation,
    kind: RobotKind,
    position: DVec2,
    direction: f64,
    speed: f64,
) -> EntityId {
    let id = sim.spawn_robot_at(kind, position);
    let motion = motion_mut(sim, id);
    motion.direction = direction;
    motion.current_speed = speed;
    id
}

// =============================================================================
// State Access
// =============================================================================

/// Returns an entity's position.
pub fn position_of(sim: &Simulation, id: EntityId) -> DVec2 {
    sim.arena().get(id).unwrap().position()
}

/// Returns a robot's motion.
pub fn motion_of(sim: &Simulation, id: EntityId) -> Motion {
    *sim.arena().get(id).unwrap().as_robot().unwrap().motion()
}

/// Returns a robot's motion mutably.
pub fn motion_mut(sim: &mut Simulation, id: EntityId) -> &mut Motion {
    sim.arena_mut()
        .get_mut(id)
        .unwrap()
        .as_robot_mut()
        .unwrap()
        .motion_mut()
}

/// Every entity as `(id, tag, position)`, in registry order.
pub fn layout(sim: &Simulation) -> Vec<(EntityId, EntityTag, DVec2)> {
    sim.arena()
        .entities()
        .iter()
        .map(|e| (e.id(), e.tag(), e.position()))
        .collect()
}

/// Runs `ticks` steps and asserts each one was clean.
pub fn run_clean(sim: &mut Simulation, ticks: u64) {
    for _ in 0..ticks {
        let report = sim.step().unwrap();
        assert!(report.is_clean(), "tick {} faulted: {:?}", report.tick, report.faults);
    }
}
