//! Simple robot: random walk, turns aside from anything within 30 units.

use std::f64::consts::FRAC_PI_2;

use super::BehaviorContext;

/// Chance per tick of picking a fresh heading.
pub const HEADING_CHANGE_PROBABILITY: f64 = 0.02;

pub(super) fn step(ctx: &mut BehaviorContext<'_>) {
    ctx.update_speed();
    ctx.maybe_randomize_heading(HEADING_CHANGE_PROBABILITY);
    ctx.avoid(FRAC_PI_2);
    ctx.bounce(false);
    ctx.advance();
}
