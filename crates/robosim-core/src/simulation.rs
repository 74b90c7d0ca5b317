//! Simulation driver.
//!
//! The `Simulation` struct owns everything needed to run a world:
//!
//! 1. **Config**: bounds, placement rules, tick mode and master seed
//! 2. **Arena**: the entity registry and tick loop
//! 3. **Population**: ID allocation and validated spawning
//! 4. **Pause state**: a paused simulation ignores [`Simulation::step`]
//!
//! It is also the persistence and telemetry surface: save/load of the
//! entity list, render frames and info-panel text.
//!
//! # Determinism
//!
//! Placement draws from the population's master random source and every
//! robot owns a source seeded from it. Given the same seed and the same
//! sequence of calls, two simulations produce identical worlds in either
//! tick mode.
//!
//! # Example
//!
//! ```
//! use robosim_core::simulation::Simulation;
//! use robosim_core::entity::RobotKind;
//!
//! let mut sim = Simulation::with_seed(42);
//! sim.populate_default_layout();
//! sim.spawn_robot(RobotKind::Echo).unwrap();
//!
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.robot_info()[0].label, "EchoRobot 1");
//! ```

use glam::DVec2;
use tracing::{debug, info};

use crate::arena::{Arena, TickReport};
use crate::config::SimConfig;
use crate::entity::{Entity, EntityId, EntityTag, RobotKind};
use crate::error::{Result, SimError};
use crate::persistence;
use crate::population::Population;
use crate::telemetry::{EntitySnapshot, RobotInfo};

/// Obstacle positions of the stock layout.
pub const DEFAULT_OBSTACLES: [DVec2; 3] = [
    DVec2::new(100.0, 100.0),
    DVec2::new(300.0, 400.0),
    DVec2::new(600.0, 200.0),
];

/// Metal wall positions of the stock layout.
pub const DEFAULT_METAL_WALLS: [DVec2; 2] = [DVec2::new(200.0, 300.0), DVec2::new(500.0, 150.0)];

// =============================================================================
// Simulation
// =============================================================================

/// Owns the arena, population control and pause state.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    arena: Arena,
    population: Population,
    paused: bool,
}

impl Simulation {
    /// Creates an empty simulation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        info!(
            seed = config.seed,
            width = config.width,
            height = config.height,
            mode = ?config.tick_mode,
            "simulation created"
        );
        Ok(Self::build(config))
    }

    /// Creates an empty simulation with default settings and `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::build(SimConfig::with_seed(seed))
    }

    /// Creates a simulation holding the stock layout.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn with_default_layout(config: SimConfig) -> Result<Self> {
        let mut sim = Self::new(config)?;
        sim.populate_default_layout();
        Ok(sim)
    }

    fn build(config: SimConfig) -> Self {
        Self {
            arena: Arena::new(config.bounds(), config.tick_mode),
            population: Population::with_placement(
                config.seed,
                config.placement_clearance,
                config.max_placement_attempts,
            ),
            config,
            paused: false,
        }
    }

    /// Adds the stock obstacles and metal walls. Returns their IDs.
    pub fn populate_default_layout(&mut self) -> Vec<EntityId> {
        let mut ids = Vec::with_capacity(DEFAULT_OBSTACLES.len() + DEFAULT_METAL_WALLS.len());
        for position in DEFAULT_OBSTACLES {
            ids.push(self.add_obstacle(position));
        }
        for position in DEFAULT_METAL_WALLS {
            ids.push(self.add_metal_wall(position));
        }
        ids
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Returns the arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the arena mutably.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    // -------------------------------------------------------------------------
    // Running
    // -------------------------------------------------------------------------

    /// Runs one tick. Returns `None` without doing anything while paused.
    pub fn step(&mut self) -> Option<TickReport> {
        if self.paused {
            return None;
        }
        Some(self.arena.tick())
    }

    /// Stops [`step`](Self::step) from advancing the world.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!(tick = self.tick(), "paused");
        }
        self.paused = true;
    }

    /// Lets [`step`](Self::step) advance the world again.
    pub fn resume(&mut self) {
        if self.paused {
            debug!(tick = self.tick(), "resumed");
        }
        self.paused = false;
    }

    /// Flips the pause state. Returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    /// Returns `true` while paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    // -------------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------------

    /// Spawns a robot at a random position clear of obstacles.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Placement`] if no clear position was found.
    pub fn spawn_robot(&mut self, kind: RobotKind) -> Result<EntityId> {
        self.population.spawn_robot(&mut self.arena, kind)
    }

    /// Spawns a robot at `position` without placement checks.
    pub fn spawn_robot_at(&mut self, kind: RobotKind, position: DVec2) -> EntityId {
        self.population.spawn_robot_at(&mut self.arena, kind, position)
    }

    /// Adds an entity of `tag` at `position` without placement checks.
    pub fn spawn_static(&mut self, tag: EntityTag, position: DVec2) -> EntityId {
        self.population.spawn_static(&mut self.arena, tag, position)
    }

    /// Adds an obstacle.
    pub fn add_obstacle(&mut self, position: DVec2) -> EntityId {
        self.population.spawn_obstacle(&mut self.arena, position)
    }

    /// Adds a metal wall.
    pub fn add_metal_wall(&mut self, position: DVec2) -> EntityId {
        self.population.spawn_metal_wall(&mut self.arena, position)
    }

    /// Adds a light.
    pub fn add_light(&mut self, position: DVec2) -> EntityId {
        self.population.spawn_light(&mut self.arena, position)
    }

    /// Removes the first robot in registry order.
    pub fn remove_robot(&mut self) -> Option<Entity> {
        self.population.remove_robot(&mut self.arena)
    }

    /// Removes any entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.arena.remove(id)?;
        debug!(%id, tag = %removed.tag(), "removed entity");
        Some(removed)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Serializes every entity, in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Persistence`] if serialization fails.
    pub fn save_json(&self) -> Result<String> {
        let json = persistence::to_json(self.arena.entities())?;
        info!(entities = self.arena.len(), bytes = json.len(), "saved entities");
        Ok(json)
    }

    /// Replaces every entity with those in `json`. Returns how many were
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Persistence`] if the document is malformed or any
    /// record is invalid. The registry is left untouched in that case.
    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let records = persistence::parse_records(json)?;
        let entities = persistence::restore(records, &mut self.population)?;
        let count = entities.len();
        self.arena.replace_all(entities);
        info!(entities = count, "loaded entities");
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Telemetry
    // -------------------------------------------------------------------------

    /// Render snapshot of every entity, in registry order.
    #[must_use]
    pub fn frame(&self) -> Vec<EntitySnapshot> {
        self.arena
            .entities()
            .iter()
            .map(EntitySnapshot::capture)
            .collect()
    }

    /// Info-panel data for every robot, in registry order.
    #[must_use]
    pub fn robot_info(&self) -> Vec<RobotInfo> {
        self.arena
            .entities()
            .iter()
            .filter_map(RobotInfo::capture)
            .collect()
    }

    /// Info-panel data for one robot.
    #[must_use]
    pub fn info(&self, id: EntityId) -> Option<RobotInfo> {
        self.arena.get(id).and_then(RobotInfo::capture)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(SimConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
