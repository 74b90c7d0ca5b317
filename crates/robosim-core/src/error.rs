//! Error types for the simulation engine.
//!
//! Geometry and sensing are infallible. Errors only arise at the edges of the
//! engine: a behavior rule producing non-finite state, placement running out
//! of attempts, malformed persisted data, and invalid configuration.

use thiserror::Error;

use crate::entity::EntityId;

/// Result alias used across the engine's public API.
pub type Result<T> = std::result::Result<T, SimError>;

/// Fault raised by a single entity's update.
///
/// The arena isolates these: the faulting entity keeps its pre-update pose
/// and the rest of the tick proceeds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BehaviorError {
    /// The update produced a NaN or infinite position.
    #[error("entity {id} produced a non-finite position ({x}, {y})")]
    NonFinitePosition {
        /// Faulting entity.
        id: EntityId,
        /// Rejected x coordinate.
        x: f64,
        /// Rejected y coordinate.
        y: f64,
    },

    /// The update produced a NaN or infinite heading or speed.
    #[error("entity {id} produced a non-finite {field}: {value}")]
    NonFiniteMotion {
        /// Faulting entity.
        id: EntityId,
        /// Which motion field was rejected.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Placement of a new entity failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// Every random candidate position overlapped an obstacle's keep-out zone.
    #[error("no clear position found after {attempts} attempts")]
    Exhausted {
        /// Number of candidates tried.
        attempts: u32,
    },
}

/// Saving or loading an entity list failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The document is not valid JSON or does not match the record schema
    /// (unknown type tag, missing field, wrong field type).
    #[error("malformed entity document: {0}")]
    Json(#[from] serde_json::Error),

    /// A record parsed but its values violate an entity invariant.
    #[error("record {index} ({tag}) is invalid: {reason}")]
    InvalidRecord {
        /// Position of the record in the document.
        index: usize,
        /// Type tag of the record.
        tag: String,
        /// Human-readable description of the violation.
        reason: String,
    },
}

/// Configuration values that cannot drive a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// World dimensions must be finite and positive.
    #[error("world dimensions must be positive and finite, got {width}x{height}")]
    InvalidDimensions {
        /// Configured width.
        width: f64,
        /// Configured height.
        height: f64,
    },

    /// Placement clearance must be finite and non-negative.
    #[error("placement clearance must be non-negative, got {0}")]
    InvalidClearance(f64),

    /// At least one placement attempt is required.
    #[error("max placement attempts must be at least 1")]
    ZeroPlacementAttempts,
}

/// Top-level error for the simulation driver.
#[derive(Debug, Error)]
pub enum SimError {
    /// See [`PlacementError`].
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// See [`PersistenceError`].
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    ConfigFormat(#[source] serde_json::Error),

    /// A radius change would break the `radius > 0` invariant.
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_error_names_entity() {
        let err = BehaviorError::NonFinitePosition {
            id: EntityId::new(7),
            x: f64::NAN,
            y: 1.0,
        };
        assert!(err.to_string().starts_with("entity 7 produced"));
    }

    #[test]
    fn placement_error_converts_into_sim_error() {
        let err: SimError = PlacementError::Exhausted { attempts: 3 }.into();
        assert!(matches!(err, SimError::Placement(_)));
        assert_eq!(err.to_string(), "no clear position found after 3 attempts");
    }

    #[test]
    fn json_error_converts_into_persistence_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: PersistenceError = json_err.into();
        assert!(err.to_string().starts_with("malformed entity document"));
    }
}
