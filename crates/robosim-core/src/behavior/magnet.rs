//! Magnet robot: drawn toward, or pushed away from, the nearest robot or
//! metal wall within 150 units.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::BehaviorContext;
use crate::geometry::bearing;
use crate::sensor::TargetMask;

/// Chance per tick of flipping between attract and repel.
pub const POLARITY_FLIP_PROBABILITY: f64 = 0.01;
/// Reach of the magnetic pull.
pub const MAGNETIC_RANGE: f64 = 150.0;

/// Polarity of a magnet robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetState {
    /// `true` to steer toward the target, `false` to steer away.
    pub attract: bool,
}

impl Default for MagnetState {
    fn default() -> Self {
        Self { attract: true }
    }
}

impl MagnetState {
    pub(super) fn step(&mut self, ctx: &mut BehaviorContext<'_>) {
        ctx.update_speed();
        if ctx.rng.gen::<f64>() < POLARITY_FLIP_PROBABILITY {
            self.attract = !self.attract;
        }

        self.steer(ctx);
        ctx.bounce(false);
        ctx.advance();
    }

    /// Points at (or away from) the nearest magnetic target. Returns `false`
    /// and leaves the heading alone when nothing is in range.
    fn steer(&self, ctx: &mut BehaviorContext<'_>) -> bool {
        let here = ctx.position();
        let mask = TargetMask::ROBOT | TargetMask::METAL_WALL;
        match ctx.view.nearest(here, Some(ctx.id), mask, Some(MAGNETIC_RANGE)) {
            Some(target) => {
                let toward = bearing(here, target.position);
                ctx.motion.direction = if self.attract { toward } else { toward + PI };
                true
            }
            None => false,
        }
    }
}
