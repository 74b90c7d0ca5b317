//! Planar geometry helpers shared by sensors, behaviors and placement.
//!
//! Angles are radians measured counter-clockwise from +X in world space
//! (with +Y pointing down on screen, as the arena is drawn). Nothing in this
//! module wraps angles unless its name says so.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Euclidean distance between two centers.
#[must_use]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Bearing from `from` to `to`, as `atan2(dy, dx)` in `(-π, π]`.
#[must_use]
pub fn bearing(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Unit vector for a heading.
#[must_use]
pub fn heading_vector(direction: f64) -> DVec2 {
    DVec2::new(direction.cos(), direction.sin())
}

/// Returns `true` if `bearing` lies inside a beam of total width `beam`
/// centered on `heading`.
///
/// The raw difference is compared against half the beam and against its
/// complement to a full turn. This handles the wrap at ±π for headings in
/// `[0, 2π)` without normalizing either angle.
#[must_use]
pub fn within_beam(bearing: f64, heading: f64, beam: f64) -> bool {
    let half = beam / 2.0;
    let diff = (bearing - heading).abs();
    diff < half || diff > TAU - half
}

/// Wraps an angle into `[0, 2π)`.
///
/// Display helper only. Simulation state never passes through it.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Axis-aligned world rectangle with its origin at `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub height: f64,
}

impl Bounds {
    /// Creates bounds of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if a disc of `radius` centered at `x` pokes past the
    /// left or right edge.
    #[must_use]
    pub fn crosses_vertical_edge(&self, x: f64, radius: f64) -> bool {
        x - radius < 0.0 || x + radius > self.width
    }

    /// Returns `true` if a disc of `radius` centered at `y` pokes past the
    /// top or bottom edge.
    #[must_use]
    pub fn crosses_horizontal_edge(&self, y: f64, radius: f64) -> bool {
        y - radius < 0.0 || y + radius > self.height
    }

    /// Clamps `x` into `[radius, width - radius]`.
    ///
    /// If the world is narrower than the disc the lower bound wins.
    #[must_use]
    pub fn clamp_x(&self, x: f64, radius: f64) -> f64 {
        radius.max((self.width - radius).min(x))
    }

    /// Clamps `y` into `[radius, height - radius]`, lower bound first.
    #[must_use]
    pub fn clamp_y(&self, y: f64, radius: f64) -> f64 {
        radius.max((self.height - radius).min(y))
    }

    /// Returns `true` if the point lies inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
