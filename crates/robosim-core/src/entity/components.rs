//! Component structs shared by entity kinds.
//!
//! [`Body`] is common to every entity. [`Motion`] belongs to robots and
//! [`LightState`] to light sources.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Position and size of an entity in world space.
///
/// The radius is fixed after construction; [`Body::resize`] is the only way
/// to change it and it rejects non-positive values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Body {
    /// Center of the entity.
    pub position: DVec2,
    radius: f64,
}

impl Body {
    /// Creates a body, validating that the radius is positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRadius`] for a zero, negative or
    /// non-finite radius.
    pub fn new(position: DVec2, radius: f64) -> Result<Self, SimError> {
        if radius.is_finite() && radius > 0.0 {
            Ok(Self { position, radius })
        } else {
            Err(SimError::InvalidRadius(radius))
        }
    }

    /// Creates a body from one of the engine's compile-time radii.
    pub(crate) const fn with_fixed_radius(position: DVec2, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Returns the radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Changes the radius.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRadius`] and leaves the body unchanged if
    /// `radius` is not positive and finite.
    pub fn resize(&mut self, radius: f64) -> Result<(), SimError> {
        if radius.is_finite() && radius > 0.0 {
            self.radius = radius;
            Ok(())
        } else {
            Err(SimError::InvalidRadius(radius))
        }
    }
}

/// Speed and heading of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Upper bound for `current_speed`.
    pub max_speed: f64,
    /// Distance covered per tick; kept in `[0.5 * max_speed, max_speed]`.
    pub current_speed: f64,
    /// Heading in radians. Not wrapped.
    pub direction: f64,
}

impl Motion {
    /// Lower bound of the cruising band as a fraction of `max_speed`.
    pub const MIN_SPEED_FACTOR: f64 = 0.5;

    /// Creates motion with a random cruising speed and a random heading.
    pub fn random<R: Rng + ?Sized>(max_speed: f64, rng: &mut R) -> Self {
        let current_speed = Self::sample_speed(max_speed, rng);
        let direction = rng.gen::<f64>() * std::f64::consts::TAU;
        Self {
            max_speed,
            current_speed,
            direction,
        }
    }

    /// Draws a speed uniformly from `[0.5, 1.0) * max_speed`.
    pub fn sample_speed<R: Rng + ?Sized>(max_speed: f64, rng: &mut R) -> f64 {
        max_speed * (Self::MIN_SPEED_FACTOR + rng.gen::<f64>() * (1.0 - Self::MIN_SPEED_FACTOR))
    }

    /// Returns `true` if `current_speed` lies in the cruising band.
    #[must_use]
    pub fn speed_in_band(&self) -> bool {
        self.current_speed >= self.max_speed * Self::MIN_SPEED_FACTOR
            && self.current_speed <= self.max_speed
    }

    /// Per-tick displacement along the current heading.
    #[must_use]
    pub fn step_vector(&self) -> DVec2 {
        crate::geometry::heading_vector(self.direction) * self.current_speed
    }
}

/// State carried by a light source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    /// Brightness. Stored and persisted, not read by any behavior.
    pub intensity: f64,
}

impl Default for LightState {
    fn default() -> Self {
        Self { intensity: 1.0 }
    }
}
