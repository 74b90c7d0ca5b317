//! Property tests over random seeds and inputs.

use std::f64::consts::TAU;

use glam::DVec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::{Arena, TickMode};
use crate::entity::components::{Body, Motion};
use crate::entity::{Entity, EntityId, RobotKind};
use crate::geometry::normalize_angle;
use crate::population::{Population, DEFAULT_CLEARANCE};

use super::helpers::{motion_of, populated_sim};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sampled_speed_stays_in_band(max_speed in 0.01f64..50.0, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let motion = Motion::random(max_speed, &mut rng);
        prop_assert!(motion.speed_in_band());
        prop_assert!((0.0..=TAU).contains(&motion.direction));
    }

    #[test]
    fn body_accepts_only_positive_radius(radius in -100.0f64..100.0) {
        let result = Body::new(DVec2::ZERO, radius);
        prop_assert_eq!(result.is_ok(), radius > 0.0);
    }

    #[test]
    fn failed_resize_keeps_radius(radius in -100.0f64..=0.0) {
        let mut wall = Entity::metal_wall(EntityId::new(1), DVec2::ZERO);
        let before = wall.radius();
        prop_assert!(wall.resize(radius).is_err());
        prop_assert_eq!(wall.radius(), before);
    }

    #[test]
    fn spawns_land_clear_of_obstacles(
        seed in any::<u64>(),
        obstacles in prop::collection::vec((0.0f64..800.0, 0.0f64..600.0), 0..12),
    ) {
        let mut arena = Arena::default();
        let mut population = Population::with_placement(seed, DEFAULT_CLEARANCE, 2_000);
        for (x, y) in obstacles {
            population.spawn_obstacle(&mut arena, DVec2::new(x, y));
        }
        for _ in 0..5 {
            if let Ok(id) = population.spawn_robot(&mut arena, RobotKind::Simple) {
                let position = arena.get(id).unwrap().position();
                prop_assert!(population.is_clear(&arena, position));
            }
        }
    }

    #[test]
    fn normalized_angle_in_range(angle in -1.0e4f64..1.0e4) {
        let wrapped = normalize_angle(angle);
        prop_assert!((0.0..TAU).contains(&wrapped));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn any_seed_runs_clean(seed in any::<u64>(), snapshot in any::<bool>()) {
        let mode = if snapshot { TickMode::Snapshot } else { TickMode::Sequential };
        let (mut sim, ids) = populated_sim(seed, mode);
        for _ in 0..100 {
            let report = sim.step().unwrap();
            prop_assert!(report.is_clean());
        }
        for id in ids {
            prop_assert!(motion_of(&sim, id).speed_in_band());
        }
    }
}
