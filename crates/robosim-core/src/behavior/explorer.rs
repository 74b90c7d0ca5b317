//! Explorer robot: wide-range avoidance, and a wall rule that jitters the
//! reflection and pulls the robot back inside before it moves.

use std::f64::consts::{FRAC_PI_2, PI};

use super::BehaviorContext;

/// Chance per tick of picking a fresh heading.
pub const HEADING_CHANGE_PROBABILITY: f64 = 0.02;

pub(super) fn step(ctx: &mut BehaviorContext<'_>) {
    ctx.update_speed();
    ctx.maybe_randomize_heading(HEADING_CHANGE_PROBABILITY);
    ctx.avoid(FRAC_PI_2);
    clamp_bounce(ctx);
    ctx.advance();
}

/// Jittered reflection per crossed axis; the current coordinate on that axis
/// is clamped into `[r, dim - r]`.
fn clamp_bounce(ctx: &mut BehaviorContext<'_>) {
    let next = ctx.prospective();
    let radius = ctx.body.radius();
    let bounds = ctx.view.bounds();

    if bounds.crosses_vertical_edge(next.x, radius) {
        ctx.motion.direction = PI - ctx.motion.direction + ctx.jitter();
        ctx.body.position.x = bounds.clamp_x(ctx.body.position.x, radius);
    }
    if bounds.crosses_horizontal_edge(next.y, radius) {
        ctx.motion.direction = -ctx.motion.direction + ctx.jitter();
        ctx.body.position.y = bounds.clamp_y(ctx.body.position.y, radius);
    }
}
