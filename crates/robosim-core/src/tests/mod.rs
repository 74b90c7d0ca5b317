//! Crate-level tests that drive whole simulations.
//!
//! - **Determinism tests**: same seed and inputs produce identical worlds
//! - **Integration tests**: spawn, step, fault, save and load end-to-end
//! - **Property tests**: invariants over random seeds and inputs
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end tests of the simulation
//! - `properties.rs`: proptest suites
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;
mod integration;
mod properties;

pub use helpers::*;
