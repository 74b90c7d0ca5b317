//! Robot sensors.
//!
//! A [`Sensor`] answers one question: given the world view and the owning
//! robot's pose, is a qualifying target present? Every sensor skips its
//! owner, measures center to center and compares with a strict `<`.
//!
//! | Kind       | Matches                 | Condition                                   |
//! |------------|-------------------------|---------------------------------------------|
//! | `Obstacle` | any entity              | `d < range`                                 |
//! | `Whisker`  | any entity              | `d < length + target.radius`                |
//! | `Echo`     | any entity              | `d < range` and bearing inside the beam     |
//! | `Light`    | lights                  | `d < range`                                 |
//! | `Magnetic` | robots                  | `d < range`                                 |

use std::f64::consts::FRAC_PI_3;

use bitflags::bitflags;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityTag};
use crate::geometry::{bearing, within_beam};
use crate::world_view::WorldView;

bitflags! {
    /// Set of entity kinds a query or sensor reacts to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TargetMask: u8 {
        /// Obstacles.
        const OBSTACLE = 0b0001;
        /// Metal walls.
        const METAL_WALL = 0b0010;
        /// Lights.
        const LIGHT = 0b0100;
        /// Robots of any kind.
        const ROBOT = 0b1000;
    }
}

impl TargetMask {
    /// Returns the single flag for `tag`.
    #[must_use]
    pub const fn of(tag: EntityTag) -> Self {
        match tag {
            EntityTag::Obstacle => Self::OBSTACLE,
            EntityTag::MetalWall => Self::METAL_WALL,
            EntityTag::Light => Self::LIGHT,
            EntityTag::Robot(_) => Self::ROBOT,
        }
    }

    /// Returns `true` if `tag` is in the set.
    #[must_use]
    pub const fn matches(self, tag: EntityTag) -> bool {
        self.intersects(Self::of(tag))
    }
}

/// Pose of the robot doing the sensing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Owner, always excluded from detection.
    pub id: EntityId,
    /// Owner's center.
    pub position: DVec2,
    /// Owner's heading in radians, unnormalized.
    pub heading: f64,
}

/// A sensor mounted on a robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Sensor {
    /// Proximity sensor.
    Obstacle {
        /// Detection range.
        range: f64,
    },
    /// Contact whisker; reach grows with the target's radius.
    Whisker {
        /// Whisker length.
        length: f64,
    },
    /// Forward cone.
    Echo {
        /// Detection range.
        range: f64,
        /// Total beam width in radians.
        beam: f64,
    },
    /// Light detector.
    Light {
        /// Detection range.
        range: f64,
    },
    /// Detects other robots.
    Magnetic {
        /// Detection range.
        range: f64,
    },
}

impl Sensor {
    /// Echo beam width used by echo robots (60°).
    pub const DEFAULT_ECHO_BEAM: f64 = FRAC_PI_3;

    /// Kinds of entity this sensor can react to.
    #[must_use]
    pub const fn targets(&self) -> TargetMask {
        match self {
            Self::Obstacle { .. } | Self::Whisker { .. } | Self::Echo { .. } => TargetMask::all(),
            Self::Light { .. } => TargetMask::LIGHT,
            Self::Magnetic { .. } => TargetMask::ROBOT,
        }
    }

    /// Nominal reach, used for rendering.
    #[must_use]
    pub const fn range(&self) -> f64 {
        match *self {
            Self::Obstacle { range }
            | Self::Echo { range, .. }
            | Self::Light { range }
            | Self::Magnetic { range } => range,
            Self::Whisker { length } => length,
        }
    }

    /// Returns `true` if any qualifying entity other than the owner is in
    /// reach.
    #[must_use]
    pub fn detect(&self, probe: &Probe, view: &WorldView) -> bool {
        let mut candidates = view.matching(Some(probe.id), self.targets());
        match *self {
            Self::Obstacle { range } | Self::Light { range } | Self::Magnetic { range } => {
                candidates.any(|p| p.distance_to(probe.position) < range)
            }
            Self::Whisker { length } => {
                candidates.any(|p| p.distance_to(probe.position) < length + p.radius)
            }
            Self::Echo { range, beam } => candidates.any(|p| {
                p.distance_to(probe.position) < range
                    && within_beam(bearing(probe.position, p.position), probe.heading, beam)
            }),
        }
    }
}
