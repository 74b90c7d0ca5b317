//! # Robosim Core
//!
//! Discrete-time 2D robot arena simulation.
//!
//! A rectangular arena holds static items (obstacles, metal walls, lights)
//! and autonomous robots. Every tick each robot reads its sensors against a
//! view of the world, applies its steering rule and moves.
//!
//! ## Architecture
//!
//! - **Entities**: tagged items with a circular body; robots add motion,
//!   sensors, a behavior and a private random source
//! - **Sensors**: obstacle, whisker, echo, light and magnetic detectors
//!   evaluated against a [`world_view::WorldView`]
//! - **Behaviors**: one steering rule per robot kind
//! - **Arena**: registry and tick loop, sequential or snapshot-parallel
//! - **Simulation**: pause state, population control, persistence and
//!   telemetry
//!
//! ## Usage
//!
//! ```rust
//! use robosim_core::{RobotKind, SimConfig, Simulation};
//!
//! let mut sim = Simulation::with_default_layout(SimConfig::with_seed(7)).unwrap();
//! sim.spawn_robot(RobotKind::Whisker).unwrap();
//! sim.step();
//!
//! let saved = sim.save_json().unwrap();
//! assert!(saved.contains("WhiskerRobot"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod persistence;
pub mod population;
pub mod sensor;
pub mod simulation;
pub mod telemetry;
pub mod world_view;

#[cfg(test)]
mod tests;

pub use arena::{Arena, TickMode, TickReport};
pub use behavior::Behavior;
pub use config::SimConfig;
pub use entity::{Entity, EntityId, EntityTag, RobotKind};
pub use error::{Result, SimError};
pub use geometry::Bounds;
pub use simulation::Simulation;
pub use telemetry::{EntitySnapshot, RobotInfo};
