//! Per-kind robot behavior rules.
//!
//! Every robot carries a [`Behavior`] variant. Once per tick the arena hands
//! the robot a [`BehaviorContext`] (its body, motion, sensors, random source
//! and the current [`WorldView`]) and the variant's rule moves it.
//!
//! # Shared sub-steps
//!
//! Most rules are assembled from the same pieces, each a method on
//! [`BehaviorContext`]:
//!
//! - [`update_speed`](BehaviorContext::update_speed): occasionally re-sample
//!   cruising speed
//! - [`maybe_randomize_heading`](BehaviorContext::maybe_randomize_heading):
//!   occasionally pick a fresh heading
//! - [`first_detection`](BehaviorContext::first_detection): scan sensors in
//!   mount order, stopping at the first hit
//! - [`bounce`](BehaviorContext::bounce): reflect the heading off the arena
//!   walls based on the prospective next position
//! - [`advance`](BehaviorContext::advance): move one step along the heading
//!
//! Headings are never normalized here.

mod echo;
mod explorer;
mod light_seeker;
mod magnet;
mod pathfinder;
mod simple;
mod swarm;
mod whisker;

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{Body, EntityId, Motion, Robot, RobotKind};
use crate::sensor::{Probe, Sensor};
use crate::world_view::WorldView;

pub use magnet::MagnetState;
pub use pathfinder::Patrol;

/// Chance per tick that a robot re-samples its cruising speed.
pub const SPEED_CHANGE_PROBABILITY: f64 = 0.05;

// =============================================================================
// Behavior
// =============================================================================

/// Behavior rule of a robot, plus any state the rule keeps between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// See [`RobotKind::Simple`].
    Simple,
    /// See [`RobotKind::Whisker`].
    Whisker,
    /// See [`RobotKind::Echo`].
    Echo,
    /// See [`RobotKind::LightDetector`].
    LightDetector,
    /// See [`RobotKind::Magnet`].
    Magnet(MagnetState),
    /// See [`RobotKind::Pathfinder`].
    Pathfinder(Patrol),
    /// See [`RobotKind::Swarm`].
    Swarm,
    /// See [`RobotKind::Explorer`].
    Explorer,
}

impl Behavior {
    /// Returns the starting behavior for a freshly spawned robot of `kind`.
    #[must_use]
    pub fn initial(kind: RobotKind) -> Self {
        match kind {
            RobotKind::Simple => Self::Simple,
            RobotKind::Whisker => Self::Whisker,
            RobotKind::Echo => Self::Echo,
            RobotKind::LightDetector => Self::LightDetector,
            RobotKind::Magnet => Self::Magnet(MagnetState::default()),
            RobotKind::Pathfinder => Self::Pathfinder(Patrol::default()),
            RobotKind::Swarm => Self::Swarm,
            RobotKind::Explorer => Self::Explorer,
        }
    }

    /// Returns the robot kind this rule belongs to.
    #[must_use]
    pub const fn kind(&self) -> RobotKind {
        match self {
            Self::Simple => RobotKind::Simple,
            Self::Whisker => RobotKind::Whisker,
            Self::Echo => RobotKind::Echo,
            Self::LightDetector => RobotKind::LightDetector,
            Self::Magnet(_) => RobotKind::Magnet,
            Self::Pathfinder(_) => RobotKind::Pathfinder,
            Self::Swarm => RobotKind::Swarm,
            Self::Explorer => RobotKind::Explorer,
        }
    }

    /// Runs one tick of the rule.
    pub fn apply(&mut self, ctx: &mut BehaviorContext<'_>) {
        match self {
            Self::Simple => simple::step(ctx),
            Self::Whisker => whisker::step(ctx),
            Self::Echo => echo::step(ctx),
            Self::LightDetector => light_seeker::step(ctx),
            Self::Magnet(state) => state.step(ctx),
            Self::Pathfinder(patrol) => patrol.step(ctx),
            Self::Swarm => swarm::step(ctx),
            Self::Explorer => explorer::step(ctx),
        }
    }
}

impl RobotKind {
    /// Sensors mounted on a new robot of this kind, in scan order.
    ///
    /// Kinds derived from the simple robot carry its 30-unit obstacle sensor
    /// first. Magnet, pathfinder and swarm rules never consult theirs.
    #[must_use]
    pub fn sensor_suite(self) -> Vec<Sensor> {
        let base = Sensor::Obstacle { range: 30.0 };
        match self {
            Self::Simple | Self::Pathfinder | Self::Swarm => vec![base],
            Self::Whisker => vec![base, Sensor::Whisker { length: 30.0 }],
            Self::Echo => vec![
                base,
                Sensor::Echo {
                    range: 100.0,
                    beam: Sensor::DEFAULT_ECHO_BEAM,
                },
            ],
            Self::LightDetector => vec![base, Sensor::Light { range: 80.0 }],
            Self::Magnet => vec![base, Sensor::Magnetic { range: 150.0 }],
            Self::Explorer => vec![Sensor::Obstacle { range: 50.0 }],
        }
    }
}

// =============================================================================
// BehaviorContext
// =============================================================================

/// Everything a rule may touch during one robot's update.
pub struct BehaviorContext<'a> {
    /// The updating robot.
    pub id: EntityId,
    /// The robot's body; rules move `body.position`.
    pub body: &'a mut Body,
    /// The robot's speed and heading.
    pub motion: &'a mut Motion,
    /// Mounted sensors in scan order.
    pub sensors: &'a [Sensor],
    /// The robot's private random source.
    pub rng: &'a mut ChaCha8Rng,
    /// What the robot can see this tick.
    pub view: &'a WorldView,
}

impl BehaviorContext<'_> {
    /// Current center.
    #[must_use]
    pub fn position(&self) -> DVec2 {
        self.body.position
    }

    /// Pose handed to sensors.
    #[must_use]
    pub fn probe(&self) -> Probe {
        Probe {
            id: self.id,
            position: self.body.position,
            heading: self.motion.direction,
        }
    }

    /// With probability [`SPEED_CHANGE_PROBABILITY`], re-sample cruising speed.
    pub fn update_speed(&mut self) {
        if self.rng.gen::<f64>() < SPEED_CHANGE_PROBABILITY {
            self.motion.current_speed = Motion::sample_speed(self.motion.max_speed, &mut *self.rng);
        }
    }

    /// With probability `p`, set a uniformly random heading in `[0, 2π)`.
    pub fn maybe_randomize_heading(&mut self, p: f64) {
        if self.rng.gen::<f64>() < p {
            self.motion.direction = self.rng.gen::<f64>() * TAU;
        }
    }

    /// Uniform jitter in `[-0.5, 0.5)`.
    pub fn jitter(&mut self) -> f64 {
        self.rng.gen::<f64>() - 0.5
    }

    /// Scans sensors in mount order and returns the first that fires.
    #[must_use]
    pub fn first_detection(&self) -> Option<&Sensor> {
        let probe = self.probe();
        self.sensors.iter().find(|s| s.detect(&probe, self.view))
    }

    /// Turns `base + jitter` if any sensor fires. Returns whether it did.
    pub fn avoid(&mut self, base: f64) -> bool {
        if self.first_detection().is_some() {
            self.motion.direction += base + self.jitter();
            true
        } else {
            false
        }
    }

    /// Position after one step along the current heading.
    #[must_use]
    pub fn prospective(&self) -> DVec2 {
        self.body.position + self.motion.step_vector()
    }

    /// Reflects the heading off the arena walls.
    ///
    /// The prospective position is computed once, before either reflection.
    /// Crossing a left/right wall sets `dir = π - dir`; crossing top/bottom
    /// then sets `dir = -dir`. When `jittered`, each reflection adds its own
    /// [`jitter`](Self::jitter).
    pub fn bounce(&mut self, jittered: bool) {
        let next = self.prospective();
        let radius = self.body.radius();
        let bounds = self.view.bounds();

        if bounds.crosses_vertical_edge(next.x, radius) {
            let jitter = if jittered { self.jitter() } else { 0.0 };
            self.motion.direction = PI - self.motion.direction + jitter;
        }
        if bounds.crosses_horizontal_edge(next.y, radius) {
            let jitter = if jittered { self.jitter() } else { 0.0 };
            self.motion.direction = -self.motion.direction + jitter;
        }
    }

    /// Moves one step along the current heading.
    pub fn advance(&mut self) {
        self.body.position += self.motion.step_vector();
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_support::Rig;
    use super::*;
    use crate::entity::Entity;

    const EPS: f64 = 1e-9;

    mod suite_tests {
        use super::*;

        #[test]
        fn derived_kinds_lead_with_obstacle_sensor() {
            for kind in [
                RobotKind::Simple,
                RobotKind::Whisker,
                RobotKind::Echo,
                RobotKind::LightDetector,
                RobotKind::Magnet,
                RobotKind::Pathfinder,
                RobotKind::Swarm,
            ] {
                assert_eq!(kind.sensor_suite()[0], Sensor::Obstacle { range: 30.0 });
            }
        }

        #[test]
        fn explorer_has_long_obstacle_sensor_only() {
            assert_eq!(
                RobotKind::Explorer.sensor_suite(),
                vec![Sensor::Obstacle { range: 50.0 }]
            );
        }

        #[test]
        fn echo_suite_has_sixty_degree_beam() {
            let suite = RobotKind::Echo.sensor_suite();
            assert_eq!(suite.len(), 2);
            match suite[1] {
                Sensor::Echo { range, beam } => {
                    assert_eq!(range, 100.0);
                    assert!((beam.to_degrees() - 60.0).abs() < EPS);
                }
                other => panic!("unexpected sensor {other:?}"),
            }
        }
    }

    mod behavior_tests {
        use super::*;

        #[test]
        fn initial_round_trips_kind() {
            for kind in RobotKind::ALL {
                assert_eq!(Behavior::initial(kind).kind(), kind);
            }
        }
    }

    mod bounce_tests {
        use super::*;

        #[test]
        fn no_bounce_in_open_space() {
            let mut rig = Rig::new(RobotKind::Simple, DVec2::new(400.0, 300.0), 0.3, &[]);
            rig.ctx().bounce(false);
            assert!((rig.motion.direction - 0.3).abs() < EPS);
        }

        #[test]
        fn right_wall_reflects_horizontally() {
            let mut rig = Rig::new(RobotKind::Simple, DVec2::new(779.0, 300.0), 0.0, &[]);
            rig.ctx().bounce(false);
            assert!((rig.motion.direction - PI).abs() < EPS);
        }

        #[test]
        fn bottom_wall_negates_heading() {
            let mut rig = Rig::new(RobotKind::Simple, DVec2::new(400.0, 579.0), PI / 2.0, &[]);
            rig.ctx().bounce(false);
            assert!((rig.motion.direction + PI / 2.0).abs() < EPS);
        }

        #[test]
        fn corner_applies_both_reflections() {
            let heading = PI / 4.0;
            let mut rig = Rig::new(RobotKind::Simple, DVec2::new(779.0, 579.0), heading, &[]);
            rig.ctx().bounce(false);
            // π - θ, then negated.
            assert!((rig.motion.direction - (heading - PI)).abs() < EPS);
        }

        #[test]
        fn jittered_bounce_stays_within_half_radian() {
            let mut rig = Rig::new(RobotKind::Whisker, DVec2::new(779.0, 300.0), 0.0, &[]);
            rig.ctx().bounce(true);
            assert!((rig.motion.direction - PI).abs() <= 0.5);
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn advance_moves_by_speed() {
            let mut rig = Rig::new(RobotKind::Simple, DVec2::new(400.0, 300.0), 0.0, &[]);
            rig.ctx().advance();
            assert!((rig.body.position.x - 402.0).abs() < EPS);
            assert!((rig.body.position.y - 300.0).abs() < EPS);
        }

        #[test]
        fn update_speed_keeps_band() {
            let mut rig = Rig::new(RobotKind::Simple, DVec2::new(400.0, 300.0), 0.0, &[]);
            for _ in 0..500 {
                rig.ctx().update_speed();
                assert!(rig.motion.speed_in_band());
            }
        }

        #[test]
        fn first_detection_reports_first_firing_sensor() {
            let light = Entity::light(EntityId::new(1), DVec2::new(460.0, 300.0));
            let mut rig = Rig::new(
                RobotKind::LightDetector,
                DVec2::new(400.0, 300.0),
                0.0,
                std::slice::from_ref(&light),
            );
            let ctx = rig.ctx();
            // 60 away: outside the obstacle sensor, inside the light sensor.
            assert_eq!(ctx.first_detection(), Some(&Sensor::Light { range: 80.0 }));
        }
    }
}
