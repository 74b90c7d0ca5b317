//! Echo robot: turns around when its forward beam or proximity sensor fires.

use std::f64::consts::PI;

use super::BehaviorContext;

/// Chance per tick of picking a fresh heading.
pub const HEADING_CHANGE_PROBABILITY: f64 = 0.015;

pub(super) fn step(ctx: &mut BehaviorContext<'_>) {
    ctx.update_speed();
    ctx.maybe_randomize_heading(HEADING_CHANGE_PROBABILITY);
    ctx.avoid(PI);
    ctx.bounce(false);
    ctx.advance();
}
