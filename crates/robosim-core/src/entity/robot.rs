//! Robot state carried inside [`EntityInner::Robot`](super::EntityInner).

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::components::{Body, Motion};
use super::{EntityId, RobotKind};
use crate::behavior::{Behavior, BehaviorContext};
use crate::error::BehaviorError;
use crate::sensor::Sensor;
use crate::world_view::WorldView;

/// A mobile agent: motion, sensors, behavior rule and a private random
/// source.
///
/// Each robot owns a [`ChaCha8Rng`] seeded at spawn, so its decisions do not
/// depend on the order in which other robots consume randomness. This is
/// what keeps snapshot ticks deterministic under rayon.
#[derive(Debug, Clone)]
pub struct Robot {
    ordinal: u32,
    seed: u64,
    motion: Motion,
    sensors: Vec<Sensor>,
    behavior: Behavior,
    rng: ChaCha8Rng,
}

impl Robot {
    /// Body radius shared by every robot kind.
    pub const RADIUS: f64 = 20.0;
    /// Top speed shared by every robot kind.
    pub const MAX_SPEED: f64 = 3.0;

    /// Creates a robot with random cruising speed and heading drawn from
    /// `seed`.
    #[must_use]
    pub fn new(kind: RobotKind, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let motion = Motion::random(Self::MAX_SPEED, &mut rng);
        Self {
            ordinal: 0,
            seed,
            motion,
            sensors: kind.sensor_suite(),
            behavior: Behavior::initial(kind),
            rng,
        }
    }

    /// Rebuilds a robot from persisted parts.
    ///
    /// The sensor suite is derived from the behavior's kind.
    #[must_use]
    pub fn restore(behavior: Behavior, motion: Motion, ordinal: u32, seed: u64) -> Self {
        Self {
            ordinal,
            seed,
            motion,
            sensors: behavior.kind().sensor_suite(),
            behavior,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Sets the per-kind spawn ordinal used in labels.
    #[must_use]
    pub const fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }

    /// Returns the robot's kind.
    #[must_use]
    pub const fn kind(&self) -> RobotKind {
        self.behavior.kind()
    }

    /// Returns the per-kind spawn ordinal.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Returns the seed the robot's random source was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Display label, e.g. `"EchoRobot 3"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.kind(), self.ordinal)
    }

    /// Returns the robot's motion.
    #[must_use]
    pub const fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Returns mutable motion.
    #[must_use]
    pub fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    /// Returns the mounted sensors, in scan order.
    #[must_use]
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Returns the behavior rule and its state.
    #[must_use]
    pub const fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Returns mutable behavior state.
    #[must_use]
    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    /// Runs one tick of this robot's rule, moving `body`.
    ///
    /// On a non-finite result, body, motion and behavior state are put back
    /// the way they were. The random source is not rewound.
    pub(crate) fn update(
        &mut self,
        id: EntityId,
        body: &mut Body,
        view: &WorldView,
    ) -> Result<(), BehaviorError> {
        let saved_body = *body;
        let saved_motion = self.motion;
        let saved_behavior = self.behavior.clone();

        let Self {
            motion,
            sensors,
            behavior,
            rng,
            ..
        } = self;
        let mut ctx = BehaviorContext {
            id,
            body: &mut *body,
            motion,
            sensors,
            rng,
            view,
        };
        behavior.apply(&mut ctx);

        if let Err(err) = check_finite(id, body.position, &self.motion) {
            *body = saved_body;
            self.motion = saved_motion;
            self.behavior = saved_behavior;
            return Err(err);
        }
        Ok(())
    }
}

fn check_finite(id: EntityId, position: DVec2, motion: &Motion) -> Result<(), BehaviorError> {
    if !position.is_finite() {
        return Err(BehaviorError::NonFinitePosition {
            id,
            x: position.x,
            y: position.y,
        });
    }
    if !motion.direction.is_finite() {
        return Err(BehaviorError::NonFiniteMotion {
            id,
            field: "direction",
            value: motion.direction,
        });
    }
    if !motion.current_speed.is_finite() {
        return Err(BehaviorError::NonFiniteMotion {
            id,
            field: "current_speed",
            value: motion.current_speed,
        });
    }
    Ok(())
}
