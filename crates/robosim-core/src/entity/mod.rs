//! Entity model for the arena.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier handed out by population control
//! - [`EntityTag`]: Closed classification of every item kind
//! - [`RobotKind`]: The robot variants, each with its own behavior rule
//! - [`EntityInner`]: Kind-specific storage (static items and robots)
//! - [`Entity`]: The complete entity container
//!
//! # Architecture
//!
//! There is no type hierarchy. An entity is a [`Body`] plus an
//! [`EntityInner`] variant; the tag is derived from the variant so the two
//! can never disagree. Static items carry no behavior and no-op on update.
//! Robots carry a [`Robot`] with motion, sensors, behavior state and their
//! own random source.
//!
//! # Example
//!
//! ```
//! use robosim_core::entity::{Entity, EntityId, EntityTag};
//! use glam::DVec2;
//!
//! let obstacle = Entity::obstacle(EntityId::new(42), DVec2::new(100.0, 100.0));
//!
//! assert_eq!(obstacle.id().as_u64(), 42);
//! assert_eq!(obstacle.tag(), EntityTag::Obstacle);
//! assert_eq!(obstacle.radius(), 25.0);
//! ```

pub mod components;
mod robot;

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{BehaviorError, SimError};
use crate::world_view::{Presence, WorldView};

pub use components::{Body, LightState, Motion};
pub use robot::Robot;

/// Radius of an [`EntityTag::Obstacle`].
pub const OBSTACLE_RADIUS: f64 = 25.0;
/// Default radius of an [`EntityTag::MetalWall`].
pub const METAL_WALL_RADIUS: f64 = 40.0;
/// Radius of an [`EntityTag::Light`].
pub const LIGHT_RADIUS: f64 = 15.0;

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. IDs are handed out by
/// [`IdAllocator`](crate::population::IdAllocator), are immutable once
/// assigned and are never reused within a simulation.
///
/// # Example
///
/// ```
/// use robosim_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Robot variants. Each maps to one behavior rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RobotKind {
    /// Random walk with short-range obstacle avoidance.
    Simple,
    /// Random walk with whisker contact sensing and jittered wall bounces.
    Whisker,
    /// Reverses course when the forward echo beam hits something.
    Echo,
    /// Steers toward the nearest light once one is sensed.
    LightDetector,
    /// Attracts to or repels from the nearest robot or metal wall.
    Magnet,
    /// Patrols a fixed rectangle of waypoints.
    Pathfinder,
    /// Cohesion toward nearby swarm peers with short-range separation.
    Swarm,
    /// Random walk that clamps itself back inside the walls.
    Explorer,
}

impl RobotKind {
    /// Every robot kind, in declaration order.
    pub const ALL: [RobotKind; 8] = [
        RobotKind::Simple,
        RobotKind::Whisker,
        RobotKind::Echo,
        RobotKind::LightDetector,
        RobotKind::Magnet,
        RobotKind::Pathfinder,
        RobotKind::Swarm,
        RobotKind::Explorer,
    ];

    /// Type name used in labels and persisted type tags.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Simple => "SimpleRobot",
            Self::Whisker => "WhiskerRobot",
            Self::Echo => "EchoRobot",
            Self::LightDetector => "LightDetectorRobot",
            Self::Magnet => "MagnetRobot",
            Self::Pathfinder => "PathfinderRobot",
            Self::Swarm => "SwarmRobot",
            Self::Explorer => "ExplorerRobot",
        }
    }
}

impl fmt::Display for RobotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Entity type tag.
///
/// Sensors and global queries filter on the tag (see
/// [`TargetMask`](crate::sensor::TargetMask)); renderers switch on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Static block, the only kind that excludes spawn positions.
    Obstacle,
    /// Static block that magnet robots are drawn to.
    MetalWall,
    /// Static light source.
    Light,
    /// Mobile robot of the given kind.
    Robot(RobotKind),
}

impl EntityTag {
    /// Returns `true` for every robot kind.
    #[must_use]
    pub const fn is_robot(self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Returns the robot kind, if this tag names a robot.
    #[must_use]
    pub const fn robot_kind(self) -> Option<RobotKind> {
        match self {
            Self::Robot(kind) => Some(kind),
            _ => None,
        }
    }

    /// Type name used in labels and persisted type tags.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Obstacle => "Obstacle",
            Self::MetalWall => "MetalWall",
            Self::Light => "Light",
            Self::Robot(kind) => kind.type_name(),
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Kind-specific storage for an entity.
#[derive(Debug, Clone)]
pub enum EntityInner {
    /// Static obstacle; no state beyond its body.
    Obstacle,
    /// Static metal wall; no state beyond its body.
    MetalWall,
    /// Static light source.
    Light(LightState),
    /// Mobile robot.
    Robot(Robot),
}

impl EntityInner {
    /// Returns the `EntityTag` for this inner storage.
    #[must_use]
    pub fn tag(&self) -> EntityTag {
        match self {
            Self::Obstacle => EntityTag::Obstacle,
            Self::MetalWall => EntityTag::MetalWall,
            Self::Light(_) => EntityTag::Light,
            Self::Robot(robot) => EntityTag::Robot(robot.kind()),
        }
    }
}

/// A complete entity in the arena.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - `radius > 0` (enforced by [`Body`])
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    body: Body,
    inner: EntityInner,
}

impl Entity {
    /// Creates an entity from its parts.
    #[must_use]
    pub const fn new(id: EntityId, body: Body, inner: EntityInner) -> Self {
        Self { id, body, inner }
    }

    /// Creates an obstacle of the standard radius.
    #[must_use]
    pub fn obstacle(id: EntityId, position: DVec2) -> Self {
        Self::new(
            id,
            Body::with_fixed_radius(position, OBSTACLE_RADIUS),
            EntityInner::Obstacle,
        )
    }

    /// Creates a metal wall of the standard radius.
    #[must_use]
    pub fn metal_wall(id: EntityId, position: DVec2) -> Self {
        Self::new(
            id,
            Body::with_fixed_radius(position, METAL_WALL_RADIUS),
            EntityInner::MetalWall,
        )
    }

    /// Creates a metal wall with a custom radius.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRadius`] if `radius` is not positive.
    pub fn metal_wall_with_radius(
        id: EntityId,
        position: DVec2,
        radius: f64,
    ) -> Result<Self, SimError> {
        Ok(Self::new(
            id,
            Body::new(position, radius)?,
            EntityInner::MetalWall,
        ))
    }

    /// Creates a light of the standard radius and unit intensity.
    #[must_use]
    pub fn light(id: EntityId, position: DVec2) -> Self {
        Self::new(
            id,
            Body::with_fixed_radius(position, LIGHT_RADIUS),
            EntityInner::Light(LightState::default()),
        )
    }

    /// Wraps a robot at the given position with the standard robot radius.
    #[must_use]
    pub fn robot(id: EntityId, position: DVec2, robot: Robot) -> Self {
        Self::new(
            id,
            Body::with_fixed_radius(position, Robot::RADIUS),
            EntityInner::Robot(robot),
        )
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns the entity's body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the entity's center.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        self.body.position
    }

    /// Moves the entity to `position`.
    pub fn set_position(&mut self, position: DVec2) {
        self.body.position = position;
    }

    /// Returns the entity's radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.body.radius()
    }

    /// Changes the entity's radius.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRadius`] if `radius` is not positive.
    pub fn resize(&mut self, radius: f64) -> Result<(), SimError> {
        self.body.resize(radius)
    }

    /// Returns a reference to the entity's inner storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns `true` if this entity is a robot.
    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self.inner, EntityInner::Robot(_))
    }

    /// Returns the robot state if this is a robot, `None` otherwise.
    #[must_use]
    pub const fn as_robot(&self) -> Option<&Robot> {
        match &self.inner {
            EntityInner::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    /// Returns mutable robot state if this is a robot, `None` otherwise.
    #[must_use]
    pub fn as_robot_mut(&mut self) -> Option<&mut Robot> {
        match &mut self.inner {
            EntityInner::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    /// Returns the light state if this is a light, `None` otherwise.
    #[must_use]
    pub const fn as_light(&self) -> Option<&LightState> {
        match &self.inner {
            EntityInner::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Read-only footprint used by sensors.
    #[must_use]
    pub fn presence(&self) -> Presence {
        Presence {
            id: self.id,
            tag: self.tag(),
            position: self.body.position,
            radius: self.body.radius(),
        }
    }

    /// Runs one tick of this entity's rule against `view`.
    ///
    /// Static items do nothing. Robots run their behavior; if it yields a
    /// non-finite pose, the body and motion are restored to their values
    /// from before the call and the fault is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`BehaviorError`] when the robot's rule produced a NaN or
    /// infinite position, heading or speed.
    pub fn update(&mut self, view: &WorldView) -> Result<(), BehaviorError> {
        let Self { id, body, inner } = self;
        match inner {
            EntityInner::Obstacle | EntityInner::MetalWall | EntityInner::Light(_) => Ok(()),
            EntityInner::Robot(robot) => robot.update(*id, body, view),
        }
    }
}
