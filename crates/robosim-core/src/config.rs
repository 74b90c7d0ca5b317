//! Simulation configuration.
//!
//! [`SimConfig`] is plain serde data with defaults for every field, so a
//! JSON document only needs the values it overrides:
//!
//! ```
//! use robosim_core::config::SimConfig;
//! use robosim_core::arena::TickMode;
//!
//! let config = SimConfig::from_json(r#"{"seed": 7, "tick_mode": "snapshot"}"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.tick_mode, TickMode::Snapshot);
//! assert_eq!(config.width, 800.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::arena::TickMode;
use crate::error::{ConfigError, SimError};
use crate::geometry::Bounds;
use crate::population::{DEFAULT_CLEARANCE, DEFAULT_MAX_ATTEMPTS};

/// Settings for a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World width.
    pub width: f64,
    /// World height.
    pub height: f64,
    /// Gap kept between a spawned robot's center and an obstacle's edge.
    pub placement_clearance: f64,
    /// Random placement candidates tried before a spawn fails.
    pub max_placement_attempts: u32,
    /// Scheduling of entity updates within a tick.
    pub tick_mode: TickMode,
    /// Master seed for placement and per-robot random sources.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        let bounds = Bounds::default();
        Self {
            width: bounds.width,
            height: bounds.height,
            placement_clearance: DEFAULT_CLEARANCE,
            max_placement_attempts: DEFAULT_MAX_ATTEMPTS,
            tick_mode: TickMode::default(),
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Default configuration with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigFormat`] for malformed JSON and
    /// [`SimError::Config`] for values that fail [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json).map_err(SimError::ConfigFormat)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can drive a simulation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims_ok = |v: f64| v.is_finite() && v > 0.0;
        if !dims_ok(self.width) || !dims_ok(self.height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.placement_clearance.is_finite() || self.placement_clearance < 0.0 {
            return Err(ConfigError::InvalidClearance(self.placement_clearance));
        }
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::ZeroPlacementAttempts);
        }
        Ok(())
    }

    /// World rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bounds(), Bounds::new(800.0, 600.0));
        assert_eq!(config.placement_clearance, 40.0);
        assert_eq!(config.max_placement_attempts, 10_000);
        assert_eq!(config.tick_mode, TickMode::Sequential);
    }

    #[test]
    fn rejects_bad_dimensions() {
        let config = SimConfig {
            width: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        let config = SimConfig {
            height: f64::INFINITY,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_clearance_and_zero_attempts() {
        let config = SimConfig {
            placement_clearance: -1.0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidClearance(-1.0)));
        let config = SimConfig {
            max_placement_attempts: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPlacementAttempts));
    }

    #[test]
    fn from_json_reports_format_and_value_errors() {
        assert!(matches!(
            SimConfig::from_json("{not json"),
            Err(SimError::ConfigFormat(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{"width": -5.0}"#),
            Err(SimError::Config(ConfigError::InvalidDimensions { .. }))
        ));
    }
}
