//! Persistence boundary: a typed, ordered record list in JSON.
//!
//! Each entity becomes one [`EntityRecord`], internally tagged by a `"type"`
//! field naming its kind (`"Obstacle"`, `"EchoRobot"`, ...). A saved world is
//! a JSON array of records in registry order.
//!
//! Loading is all-or-nothing: the whole document is parsed and every record
//! validated before anything is built, so a bad file never touches the live
//! registry. IDs and robot random sources are not persisted; restored
//! entities get fresh ones from [`Population`].
//!
//! ```
//! use robosim_core::persistence::{parse_records, EntityRecord};
//!
//! let json = r#"[
//!     {"type": "Obstacle", "x": 100.0, "y": 100.0, "radius": 25.0},
//!     {"type": "Light", "x": 50.0, "y": 60.0, "radius": 15.0}
//! ]"#;
//! let records = parse_records(json).unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].type_name(), "Light");
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, MagnetState, Patrol};
use crate::entity::{Body, Entity, EntityInner, LightState, Motion, Robot, RobotKind};
use crate::error::PersistenceError;
use crate::population::Population;

// =============================================================================
// Records
// =============================================================================

/// Persisted fields of a static obstacle or metal wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Radius.
    pub radius: f64,
}

/// Persisted fields of a light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRecord {
    /// Body.
    #[serde(flatten)]
    pub item: ItemRecord,
    /// Brightness.
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

fn default_intensity() -> f64 {
    LightState::default().intensity
}

/// Persisted fields shared by every robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotRecord {
    /// Body.
    #[serde(flatten)]
    pub item: ItemRecord,
    /// Speed cap.
    pub max_speed: f64,
    /// Cruising speed.
    pub current_speed: f64,
    /// Heading in radians.
    pub direction: f64,
    /// Per-kind spawn ordinal; `0` means unnumbered.
    #[serde(default)]
    pub ordinal: u32,
}

/// Persisted magnet robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetRecord {
    /// Common robot fields.
    #[serde(flatten)]
    pub robot: RobotRecord,
    /// Polarity.
    #[serde(default = "default_attract")]
    pub attract: bool,
}

fn default_attract() -> bool {
    MagnetState::default().attract
}

/// Persisted pathfinder robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathfinderRecord {
    /// Common robot fields.
    #[serde(flatten)]
    pub robot: RobotRecord,
    /// Patrol route.
    pub waypoints: Vec<DVec2>,
    /// Index of the waypoint being approached.
    #[serde(default)]
    pub current_waypoint: usize,
}

/// One persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityRecord {
    /// Static obstacle.
    Obstacle(ItemRecord),
    /// Static metal wall.
    MetalWall(ItemRecord),
    /// Light source.
    Light(LightRecord),
    /// Simple robot.
    SimpleRobot(RobotRecord),
    /// Whisker robot.
    WhiskerRobot(RobotRecord),
    /// Echo robot.
    EchoRobot(RobotRecord),
    /// Light detector robot.
    LightDetectorRobot(RobotRecord),
    /// Magnet robot.
    MagnetRobot(MagnetRecord),
    /// Pathfinder robot.
    PathfinderRobot(PathfinderRecord),
    /// Swarm robot.
    SwarmRobot(RobotRecord),
    /// Explorer robot.
    ExplorerRobot(RobotRecord),
}

impl EntityRecord {
    /// Captures an entity's persisted fields.
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        let item = ItemRecord {
            x: entity.position().x,
            y: entity.position().y,
            radius: entity.radius(),
        };
        match entity.inner() {
            EntityInner::Obstacle => Self::Obstacle(item),
            EntityInner::MetalWall => Self::MetalWall(item),
            EntityInner::Light(light) => Self::Light(LightRecord {
                item,
                intensity: light.intensity,
            }),
            EntityInner::Robot(robot) => {
                let motion = robot.motion();
                let record = RobotRecord {
                    item,
                    max_speed: motion.max_speed,
                    current_speed: motion.current_speed,
                    direction: motion.direction,
                    ordinal: robot.ordinal(),
                };
                match robot.behavior() {
                    Behavior::Simple => Self::SimpleRobot(record),
                    Behavior::Whisker => Self::WhiskerRobot(record),
                    Behavior::Echo => Self::EchoRobot(record),
                    Behavior::LightDetector => Self::LightDetectorRobot(record),
                    Behavior::Magnet(state) => Self::MagnetRobot(MagnetRecord {
                        robot: record,
                        attract: state.attract,
                    }),
                    Behavior::Pathfinder(patrol) => Self::PathfinderRobot(PathfinderRecord {
                        robot: record,
                        waypoints: patrol.waypoints().to_vec(),
                        current_waypoint: patrol.current(),
                    }),
                    Behavior::Swarm => Self::SwarmRobot(record),
                    Behavior::Explorer => Self::ExplorerRobot(record),
                }
            }
        }
    }

    /// The `"type"` tag of this record.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Obstacle(_) => "Obstacle",
            Self::MetalWall(_) => "MetalWall",
            Self::Light(_) => "Light",
            Self::SimpleRobot(_) => RobotKind::Simple.type_name(),
            Self::WhiskerRobot(_) => RobotKind::Whisker.type_name(),
            Self::EchoRobot(_) => RobotKind::Echo.type_name(),
            Self::LightDetectorRobot(_) => RobotKind::LightDetector.type_name(),
            Self::MagnetRobot(_) => RobotKind::Magnet.type_name(),
            Self::PathfinderRobot(_) => RobotKind::Pathfinder.type_name(),
            Self::SwarmRobot(_) => RobotKind::Swarm.type_name(),
            Self::ExplorerRobot(_) => RobotKind::Explorer.type_name(),
        }
    }

    /// Body fields of the record.
    #[must_use]
    pub const fn item(&self) -> &ItemRecord {
        match self {
            Self::Obstacle(item) | Self::MetalWall(item) => item,
            Self::Light(light) => &light.item,
            Self::MagnetRobot(magnet) => &magnet.robot.item,
            Self::PathfinderRobot(pathfinder) => &pathfinder.robot.item,
            Self::SimpleRobot(robot)
            | Self::WhiskerRobot(robot)
            | Self::EchoRobot(robot)
            | Self::LightDetectorRobot(robot)
            | Self::SwarmRobot(robot)
            | Self::ExplorerRobot(robot) => &robot.item,
        }
    }

    /// Robot kind and motion fields, or `None` for static items.
    #[must_use]
    pub const fn robot(&self) -> Option<(RobotKind, &RobotRecord)> {
        match self {
            Self::Obstacle(_) | Self::MetalWall(_) | Self::Light(_) => None,
            Self::SimpleRobot(r) => Some((RobotKind::Simple, r)),
            Self::WhiskerRobot(r) => Some((RobotKind::Whisker, r)),
            Self::EchoRobot(r) => Some((RobotKind::Echo, r)),
            Self::LightDetectorRobot(r) => Some((RobotKind::LightDetector, r)),
            Self::MagnetRobot(m) => Some((RobotKind::Magnet, &m.robot)),
            Self::PathfinderRobot(p) => Some((RobotKind::Pathfinder, &p.robot)),
            Self::SwarmRobot(r) => Some((RobotKind::Swarm, r)),
            Self::ExplorerRobot(r) => Some((RobotKind::Explorer, r)),
        }
    }

    /// Checks every value against the entity invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidRecord`] naming `index` and the
    /// first violation found.
    pub fn validate(&self, index: usize) -> Result<(), PersistenceError> {
        self.check().map_err(|reason| PersistenceError::InvalidRecord {
            index,
            tag: self.type_name().to_string(),
            reason,
        })
    }

    fn check(&self) -> Result<(), String> {
        let item = self.item();
        finite("x", item.x)?;
        finite("y", item.y)?;
        finite("radius", item.radius)?;
        if item.radius <= 0.0 {
            return Err(format!("radius must be positive, got {}", item.radius));
        }

        match self {
            Self::Obstacle(_) | Self::MetalWall(_) => Ok(()),
            Self::Light(light) => finite("intensity", light.intensity),
            Self::MagnetRobot(magnet) => check_robot(&magnet.robot),
            Self::PathfinderRobot(pathfinder) => {
                check_robot(&pathfinder.robot)?;
                for (i, waypoint) in pathfinder.waypoints.iter().enumerate() {
                    if !waypoint.is_finite() {
                        return Err(format!("waypoint {i} is not finite"));
                    }
                }
                let len = pathfinder.waypoints.len();
                let current = pathfinder.current_waypoint;
                if (len == 0 && current != 0) || (len > 0 && current >= len) {
                    return Err(format!(
                        "current_waypoint {current} out of range for {len} waypoints"
                    ));
                }
                Ok(())
            }
            Self::SimpleRobot(robot)
            | Self::WhiskerRobot(robot)
            | Self::EchoRobot(robot)
            | Self::LightDetectorRobot(robot)
            | Self::SwarmRobot(robot)
            | Self::ExplorerRobot(robot) => check_robot(robot),
        }
    }
}

fn finite(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{field} is not finite ({value})"))
    }
}

fn check_robot(robot: &RobotRecord) -> Result<(), String> {
    finite("max_speed", robot.max_speed)?;
    finite("current_speed", robot.current_speed)?;
    finite("direction", robot.direction)?;
    if robot.max_speed <= 0.0 {
        return Err(format!("max_speed must be positive, got {}", robot.max_speed));
    }
    let motion = robot_motion(robot);
    if !motion.speed_in_band() {
        return Err(format!(
            "current_speed {} outside [{}, {}]",
            robot.current_speed,
            robot.max_speed * Motion::MIN_SPEED_FACTOR,
            robot.max_speed
        ));
    }
    Ok(())
}

fn robot_motion(robot: &RobotRecord) -> Motion {
    Motion {
        max_speed: robot.max_speed,
        current_speed: robot.current_speed,
        direction: robot.direction,
    }
}

// =============================================================================
// Save / load
// =============================================================================

/// Serializes `entities` as a pretty-printed JSON record array.
///
/// # Errors
///
/// Returns [`PersistenceError::Json`] if serialization fails.
pub fn to_json(entities: &[Entity]) -> Result<String, PersistenceError> {
    let records: Vec<EntityRecord> = entities.iter().map(EntityRecord::from_entity).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parses and validates a JSON record array.
///
/// # Errors
///
/// Returns [`PersistenceError::Json`] for malformed JSON, unknown type tags
/// or missing fields, and [`PersistenceError::InvalidRecord`] for the first
/// record whose values break an invariant.
pub fn parse_records(json: &str) -> Result<Vec<EntityRecord>, PersistenceError> {
    let records: Vec<EntityRecord> = serde_json::from_str(json)?;
    for (index, record) in records.iter().enumerate() {
        record.validate(index)?;
    }
    Ok(records)
}

/// Builds entities from validated records, drawing IDs, robot seeds and
/// missing ordinals from `population`.
///
/// # Errors
///
/// Returns [`PersistenceError::InvalidRecord`] if a record fails
/// validation.
pub fn restore(
    records: Vec<EntityRecord>,
    population: &mut Population,
) -> Result<Vec<Entity>, PersistenceError> {
    for (index, record) in records.iter().enumerate() {
        record.validate(index)?;
    }
    // Unnumbered robots must be numbered past every explicit ordinal of
    // their kind, wherever it appears in the list.
    for (kind, robot) in records.iter().filter_map(EntityRecord::robot) {
        if robot.ordinal != 0 {
            population.observe_ordinal(kind, robot.ordinal);
        }
    }

    let mut entities = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let item = *record.item();
        let body = Body::new(DVec2::new(item.x, item.y), item.radius).map_err(|err| {
            PersistenceError::InvalidRecord {
                index,
                tag: record.type_name().to_string(),
                reason: err.to_string(),
            }
        })?;
        let id = population.allocate_id();

        let inner = match record {
            EntityRecord::Obstacle(_) => EntityInner::Obstacle,
            EntityRecord::MetalWall(_) => EntityInner::MetalWall,
            EntityRecord::Light(light) => EntityInner::Light(LightState {
                intensity: light.intensity,
            }),
            EntityRecord::SimpleRobot(r) => restore_robot(population, Behavior::Simple, &r),
            EntityRecord::WhiskerRobot(r) => restore_robot(population, Behavior::Whisker, &r),
            EntityRecord::EchoRobot(r) => restore_robot(population, Behavior::Echo, &r),
            EntityRecord::LightDetectorRobot(r) => {
                restore_robot(population, Behavior::LightDetector, &r)
            }
            EntityRecord::MagnetRobot(m) => restore_robot(
                population,
                Behavior::Magnet(MagnetState { attract: m.attract }),
                &m.robot,
            ),
            EntityRecord::PathfinderRobot(p) => {
                let patrol = Patrol::resume(p.waypoints, p.current_waypoint).ok_or_else(|| {
                    PersistenceError::InvalidRecord {
                        index,
                        tag: RobotKind::Pathfinder.type_name().to_string(),
                        reason: "current_waypoint out of range".to_string(),
                    }
                })?;
                restore_robot(population, Behavior::Pathfinder(patrol), &p.robot)
            }
            EntityRecord::SwarmRobot(r) => restore_robot(population, Behavior::Swarm, &r),
            EntityRecord::ExplorerRobot(r) => restore_robot(population, Behavior::Explorer, &r),
        };
        entities.push(Entity::new(id, body, inner));
    }
    Ok(entities)
}

fn restore_robot(population: &mut Population, behavior: Behavior, record: &RobotRecord) -> EntityInner {
    let ordinal = population.claim_ordinal(behavior.kind(), record.ordinal);
    let seed = population.next_seed();
    EntityInner::Robot(Robot::restore(behavior, robot_motion(record), ordinal, seed))
}
