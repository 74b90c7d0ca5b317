//! Whisker robot: simple walk with whisker contact and jittered bounces.

use std::f64::consts::FRAC_PI_2;

use super::BehaviorContext;

/// Chance per tick of picking a fresh heading.
pub const HEADING_CHANGE_PROBABILITY: f64 = 0.01;

pub(super) fn step(ctx: &mut BehaviorContext<'_>) {
    ctx.update_speed();
    ctx.maybe_randomize_heading(HEADING_CHANGE_PROBABILITY);
    ctx.avoid(FRAC_PI_2);
    ctx.bounce(true);
    ctx.advance();
}
