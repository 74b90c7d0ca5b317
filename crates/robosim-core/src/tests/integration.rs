//! Integration tests for the full simulation pipeline.
//!
//! These tests drive a [`Simulation`] end-to-end, testing:
//! - Entity lifecycle (spawn, step, remove)
//! - Movement over many ticks
//! - Per-entity fault isolation
//! - Save/load through the driver
//! - Telemetry output

use std::f64::consts::PI;

use glam::DVec2;

use crate::arena::TickMode;
use crate::behavior::{Behavior, Patrol};
use crate::entity::{EntityTag, RobotKind, OBSTACLE_RADIUS};
use crate::error::BehaviorError;
use crate::population::DEFAULT_CLEARANCE;
use crate::simulation::Simulation;

use super::helpers::{
    layout, motion_of, populated_sim, position_of, run_clean, spawn_posed_robot,
};

const EPS: f64 = 1e-9;

// =============================================================================
// Movement
// =============================================================================

#[test]
fn free_robot_moves_along_final_heading() {
    let mut sim = Simulation::with_seed(4);
    let id = spawn_posed_robot(&mut sim, RobotKind::Simple, DVec2::new(400.0, 300.0), 0.0, 2.0);

    for _ in 0..20 {
        let before = position_of(&sim, id);
        sim.step();
        let motion = motion_of(&sim, id);
        let moved = position_of(&sim, id) - before;
        assert!((moved - motion.step_vector()).length() < EPS);
        assert!((moved.length() - motion.current_speed).abs() < EPS);
    }
}

#[test]
fn long_run_keeps_motion_valid() {
    for mode in [TickMode::Sequential, TickMode::Snapshot] {
        let (mut sim, ids) = populated_sim(2024, mode);
        run_clean(&mut sim, 1000);
        for id in ids {
            let motion = motion_of(&sim, id);
            assert!(motion.speed_in_band(), "{id} left speed band: {motion:?}");
            assert!(motion.direction.is_finite());
            let p = position_of(&sim, id);
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }
}

#[test]
fn pathfinder_reaches_first_waypoint() {
    let mut sim = Simulation::with_seed(5);
    let id = spawn_posed_robot(&mut sim, RobotKind::Pathfinder, DVec2::new(160.0, 100.0), PI, 2.0);

    let mut advanced = false;
    for _ in 0..200 {
        run_clean(&mut sim, 1);
        let entity = sim.arena().get(id).unwrap();
        if let Behavior::Pathfinder(patrol) = entity.as_robot().unwrap().behavior() {
            if patrol.current() == 1 {
                advanced = true;
                break;
            }
        }
    }
    assert!(advanced, "pathfinder never arrived at (100, 100)");
}

#[test]
fn statics_never_move() {
    let (mut sim, _) = populated_sim(6, TickMode::Sequential);
    let statics = |sim: &Simulation| {
        layout(sim)
            .into_iter()
            .filter(|(_, tag, _)| !tag.is_robot())
            .collect::<Vec<_>>()
    };
    let before = statics(&sim);
    run_clean(&mut sim, 200);
    assert_eq!(statics(&sim), before);
}

// =============================================================================
// Faults
// =============================================================================

#[test]
fn faulting_robot_is_isolated_each_tick() {
    let mut sim = Simulation::with_seed(12);
    let bad = spawn_posed_robot(&mut sim, RobotKind::Pathfinder, DVec2::new(400.0, 300.0), 0.0, 2.0);
    let good = spawn_posed_robot(&mut sim, RobotKind::Simple, DVec2::new(200.0, 450.0), 0.0, 2.0);
    *sim.arena_mut()
        .get_mut(bad)
        .unwrap()
        .as_robot_mut()
        .unwrap()
        .behavior_mut() = Behavior::Pathfinder(Patrol::new(vec![DVec2::new(f64::NAN, 0.0)]));

    for _ in 0..5 {
        let before = position_of(&sim, good);
        let report = sim.step().unwrap();
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].id, bad);
        assert!(matches!(
            report.faults[0].error,
            BehaviorError::NonFinitePosition { .. }
        ));
        assert_eq!(position_of(&sim, bad), DVec2::new(400.0, 300.0));
        assert_ne!(position_of(&sim, good), before);
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn remove_robot_goes_in_registry_order() {
    let (mut sim, ids) = populated_sim(1, TickMode::Sequential);
    for id in &ids[..3] {
        assert_eq!(sim.remove_robot().unwrap().id(), *id);
    }
    assert_eq!(sim.robot_info().len(), ids.len() - 3);
}

#[test]
fn labels_count_per_kind() {
    let mut sim = Simulation::with_seed(1);
    for kind in [RobotKind::Echo, RobotKind::Swarm, RobotKind::Echo, RobotKind::Echo] {
        sim.spawn_robot(kind).unwrap();
    }
    let labels: Vec<_> = sim.robot_info().into_iter().map(|info| info.label).collect();
    assert_eq!(
        labels,
        vec!["EchoRobot 1", "SwarmRobot 1", "EchoRobot 2", "EchoRobot 3"]
    );
}

#[test]
fn spawned_robots_clear_obstacles() {
    let (sim, ids) = populated_sim(77, TickMode::Sequential);
    let obstacles: Vec<_> = layout(&sim)
        .into_iter()
        .filter(|(_, tag, _)| *tag == EntityTag::Obstacle)
        .map(|(_, _, p)| p)
        .collect();
    for id in ids {
        let p = position_of(&sim, id);
        for obstacle in &obstacles {
            assert!(p.distance(*obstacle) >= OBSTACLE_RADIUS + DEFAULT_CLEARANCE);
        }
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn save_load_preserves_world() {
    let (mut sim, _) = populated_sim(31, TickMode::Sequential);
    run_clean(&mut sim, 25);
    let json = sim.save_json().unwrap();

    let mut restored = Simulation::with_seed(500);
    let count = restored.load_json(&json).unwrap();
    assert_eq!(count, sim.arena().len());

    let original = sim.frame();
    let loaded = restored.frame();
    for (a, b) in original.iter().zip(&loaded) {
        assert_eq!(a.tag, b.tag);
        assert!((a.x - b.x).abs() < EPS);
        assert!((a.y - b.y).abs() < EPS);
        assert!((a.radius - b.radius).abs() < EPS);
        assert_eq!(a.attract, b.attract);
        assert_eq!(a.current_waypoint, b.current_waypoint);
    }

    let labels = |s: &Simulation| s.robot_info().into_iter().map(|i| i.label).collect::<Vec<_>>();
    assert_eq!(labels(&sim), labels(&restored));

    run_clean(&mut restored, 50);
}

#[test]
fn load_continues_numbering() {
    let mut sim = Simulation::with_seed(2);
    sim.spawn_robot(RobotKind::Whisker).unwrap();
    sim.spawn_robot(RobotKind::Whisker).unwrap();
    let json = sim.save_json().unwrap();

    let mut fresh = Simulation::with_seed(3);
    fresh.load_json(&json).unwrap();
    let id = fresh.spawn_robot(RobotKind::Whisker).unwrap();
    assert_eq!(fresh.info(id).unwrap().label, "WhiskerRobot 3");
}

#[test]
fn load_rejects_unknown_type() {
    let mut sim = Simulation::with_seed(2);
    sim.populate_default_layout();
    let before = layout(&sim);
    assert!(sim
        .load_json(r#"[{"type": "Teapot", "x": 1.0, "y": 1.0, "radius": 5.0}]"#)
        .is_err());
    assert_eq!(layout(&sim), before);
}

// =============================================================================
// Telemetry
// =============================================================================

#[test]
fn info_tracks_motion() {
    let mut sim = Simulation::with_seed(9);
    let id = spawn_posed_robot(&mut sim, RobotKind::Magnet, DVec2::new(400.0, 300.0), PI / 2.0, 1.5);
    let info = sim.info(id).unwrap();
    assert!((info.direction_degrees - 90.0).abs() < EPS);
    assert!((info.current_speed - 1.5).abs() < EPS);
    assert!(info.summary().starts_with("MagnetRobot 1\nSpeed: 1.50\nAngle: 90.00°"));
}
