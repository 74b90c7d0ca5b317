//! Read-only snapshots for renderers and info panels.
//!
//! Nothing here feeds back into the simulation.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::behavior::Behavior;
use crate::entity::{Entity, EntityId, EntityTag};
use crate::geometry::normalize_angle;
use crate::sensor::Sensor;

/// Everything a renderer needs to draw one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity identity.
    pub id: EntityId,
    /// Entity kind.
    pub tag: EntityTag,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Radius.
    pub radius: f64,
    /// Heading in radians (robots only).
    pub direction: Option<f64>,
    /// Magnet polarity (magnet robots only).
    pub attract: Option<bool>,
    /// Patrol route (pathfinder robots only).
    pub waypoints: Vec<DVec2>,
    /// Waypoint being approached (pathfinder robots only).
    pub current_waypoint: Option<usize>,
    /// Mounted sensors, in scan order.
    pub sensors: Vec<Sensor>,
}

impl EntitySnapshot {
    /// Captures `entity`.
    #[must_use]
    pub fn capture(entity: &Entity) -> Self {
        let position = entity.position();
        let mut snapshot = Self {
            id: entity.id(),
            tag: entity.tag(),
            x: position.x,
            y: position.y,
            radius: entity.radius(),
            direction: None,
            attract: None,
            waypoints: Vec::new(),
            current_waypoint: None,
            sensors: Vec::new(),
        };
        if let Some(robot) = entity.as_robot() {
            snapshot.direction = Some(robot.motion().direction);
            snapshot.sensors = robot.sensors().to_vec();
            match robot.behavior() {
                Behavior::Magnet(state) => snapshot.attract = Some(state.attract),
                Behavior::Pathfinder(patrol) => {
                    snapshot.waypoints = patrol.waypoints().to_vec();
                    snapshot.current_waypoint = Some(patrol.current());
                }
                _ => {}
            }
        }
        snapshot
    }
}

/// Info-panel view of one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotInfo {
    /// Entity identity.
    pub id: EntityId,
    /// `"<TypeName> <ordinal>"`.
    pub label: String,
    /// Cruising speed.
    pub current_speed: f64,
    /// Heading in degrees, unwrapped.
    pub direction_degrees: f64,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
}

impl RobotInfo {
    /// Captures `entity`, or `None` if it is not a robot.
    #[must_use]
    pub fn capture(entity: &Entity) -> Option<Self> {
        let robot = entity.as_robot()?;
        let position = entity.position();
        Some(Self {
            id: entity.id(),
            label: robot.label(),
            current_speed: robot.motion().current_speed,
            direction_degrees: robot.motion().direction.to_degrees(),
            x: position.x,
            y: position.y,
        })
    }

    /// Heading wrapped into `[0, 360)` degrees.
    #[must_use]
    pub fn bearing_degrees(&self) -> f64 {
        normalize_angle(self.direction_degrees.to_radians()).to_degrees()
    }

    /// Multi-line panel text: label, speed, angle and location.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}\nSpeed: {:.2}\nAngle: {:.2}°\nLocation: ({:.0}, {:.0})",
            self.label, self.current_speed, self.direction_degrees, self.x, self.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Motion, Robot, RobotKind};

    fn robot_entity(kind: RobotKind) -> Entity {
        let motion = Motion {
            max_speed: 3.0,
            current_speed: 2.346,
            direction: std::f64::consts::PI,
        };
        let robot = Robot::restore(Behavior::initial(kind), motion, 3, 1);
        Entity::robot(EntityId::new(12), DVec2::new(101.4, 250.6), robot)
    }

    #[test]
    fn static_snapshot_has_no_robot_fields() {
        let snapshot = EntitySnapshot::capture(&Entity::light(EntityId::new(1), DVec2::new(5.0, 6.0)));
        assert_eq!(snapshot.tag, EntityTag::Light);
        assert_eq!(snapshot.radius, 15.0);
        assert!(snapshot.direction.is_none());
        assert!(snapshot.sensors.is_empty());
    }

    #[test]
    fn magnet_snapshot_reports_polarity() {
        let snapshot = EntitySnapshot::capture(&robot_entity(RobotKind::Magnet));
        assert_eq!(snapshot.attract, Some(true));
        assert_eq!(snapshot.sensors.len(), 2);
    }

    #[test]
    fn pathfinder_snapshot_reports_route() {
        let snapshot = EntitySnapshot::capture(&robot_entity(RobotKind::Pathfinder));
        assert_eq!(snapshot.waypoints.len(), 4);
        assert_eq!(snapshot.current_waypoint, Some(0));
        assert!(snapshot.attract.is_none());
    }

    #[test]
    fn info_summary_format() {
        let info = RobotInfo::capture(&robot_entity(RobotKind::Echo)).unwrap();
        assert_eq!(
            info.summary(),
            "EchoRobot 3\nSpeed: 2.35\nAngle: 180.00°\nLocation: (101, 251)"
        );
    }

    #[test]
    fn info_skips_statics() {
        assert!(RobotInfo::capture(&Entity::obstacle(EntityId::new(1), DVec2::ZERO)).is_none());
    }

    #[test]
    fn bearing_wraps_negative_headings() {
        let mut info = RobotInfo::capture(&robot_entity(RobotKind::Simple)).unwrap();
        info.direction_degrees = -90.0;
        assert!((info.bearing_degrees() - 270.0).abs() < 1e-9);
    }
}
