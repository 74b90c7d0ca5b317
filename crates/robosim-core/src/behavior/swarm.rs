//! Swarm robot: cohesion toward nearby swarm peers, separation from very
//! close ones.

use glam::DVec2;

use super::BehaviorContext;
use crate::entity::{EntityTag, RobotKind};
use crate::geometry::distance;
use crate::sensor::TargetMask;

/// Peers closer than this pull the robot toward their centroid.
pub const SWARM_RADIUS: f64 = 100.0;
/// Peers closer than this also push the robot away.
pub const SEPARATION_DISTANCE: f64 = 40.0;
/// Weight of the pull toward the centroid.
pub const COHESION_WEIGHT: f64 = 0.5;

pub(super) fn step(ctx: &mut BehaviorContext<'_>) {
    if let Some(heading) = flock_heading(ctx) {
        ctx.motion.direction = heading;
    }
    ctx.bounce(false);
    ctx.advance();
}

/// Heading from cohesion plus separation, or `None` with no peers in range.
fn flock_heading(ctx: &BehaviorContext<'_>) -> Option<f64> {
    let here = ctx.position();
    let swarm = EntityTag::Robot(RobotKind::Swarm);

    let mut count = 0_u32;
    let mut sum = DVec2::ZERO;
    let mut separation = DVec2::ZERO;
    for peer in ctx
        .view
        .within(here, Some(ctx.id), TargetMask::ROBOT, SWARM_RADIUS)
        .filter(|p| p.tag == swarm)
    {
        count += 1;
        sum += peer.position;
        if distance(here, peer.position) < SEPARATION_DISTANCE {
            separation += here - peer.position;
        }
    }
    if count == 0 {
        return None;
    }

    let centroid = sum / f64::from(count);
    let steer = (centroid - here) * COHESION_WEIGHT + separation;
    Some(steer.y.atan2(steer.x))
}
