//! Light detector robot.
//!
//! When any sensor fires it first points at the nearest light in the whole
//! arena (not just the one in sensor range), then turns aside by a quarter
//! turn plus jitter, the same avoidance a simple robot performs.

use std::f64::consts::FRAC_PI_2;

use super::BehaviorContext;
use crate::geometry::bearing;
use crate::sensor::TargetMask;

/// Chance per tick of picking a fresh heading.
pub const HEADING_CHANGE_PROBABILITY: f64 = 0.03;

pub(super) fn step(ctx: &mut BehaviorContext<'_>) {
    ctx.update_speed();
    ctx.maybe_randomize_heading(HEADING_CHANGE_PROBABILITY);

    if ctx.first_detection().is_some() {
        let here = ctx.position();
        if let Some(light) = ctx.view.nearest(here, Some(ctx.id), TargetMask::LIGHT, None) {
            ctx.motion.direction = bearing(here, light.position);
        }
        ctx.motion.direction += FRAC_PI_2 + ctx.jitter();
    }

    ctx.bounce(false);
    ctx.advance();
}
