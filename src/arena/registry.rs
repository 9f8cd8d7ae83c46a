//! Physics-facing records derived from arena geometry
//!
//! Walls and sensors are plain data in world space. The host physics engine
//! turns them into static bodies; nothing here holds engine handles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::{ArenaError, ColorId, Goal};
use super::geometry::{BorderSegment, SegmentKind};
use crate::{normalize_angle, vec_angle};

/// Local arena space to world space: uniform scale, then translate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldTransform {
    /// World position of the arena center
    pub origin: Vec2,
    pub scale: f32,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl WorldTransform {
    pub fn new(origin: Vec2, scale: f32) -> Self {
        Self { origin, scale }
    }

    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.origin + local * self.scale
    }

    #[inline]
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        (world - self.origin) / self.scale
    }

    pub fn polygon_to_world(&self, points: &[Vec2]) -> Vec<Vec2> {
        points.iter().map(|&p| self.to_world(p)).collect()
    }

    /// Scale must be finite and positive, origin finite
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ArenaError::InvalidDimension {
                field: "scale",
                value: self.scale,
            });
        }
        if !self.origin.x.is_finite() {
            return Err(ArenaError::InvalidDimension {
                field: "origin.x",
                value: self.origin.x,
            });
        }
        if !self.origin.y.is_finite() {
            return Err(ArenaError::InvalidDimension {
                field: "origin.y",
                value: self.origin.y,
            });
        }
        Ok(())
    }
}

/// Overlap-only goal trigger: an oriented rectangle over a goal mouth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub side_index: u32,
    pub color: ColorId,
    pub center: Vec2,
    /// Rotation of the width axis, radians
    pub angle: f32,
    /// Extent along the side
    pub width: f32,
    /// Extent along the outward normal
    pub depth: f32,
}

impl Sensor {
    /// Point in sensor frame (x along the side, y along the normal)
    #[inline]
    fn to_frame(&self, point: Vec2) -> Vec2 {
        Vec2::from_angle(-self.angle).rotate(point - self.center)
    }

    /// Oriented rectangle containment, edges inclusive
    pub fn contains_point(&self, point: Vec2) -> bool {
        let p = self.to_frame(point);
        p.x.abs() <= self.width / 2.0 && p.y.abs() <= self.depth / 2.0
    }

    /// Corners in winding order (debug drawing)
    pub fn corners(&self) -> [Vec2; 4] {
        let axis = Vec2::from_angle(self.angle);
        let u = axis * (self.width / 2.0);
        let v = axis.perp() * (self.depth / 2.0);
        [
            self.center - u - v,
            self.center + u - v,
            self.center + u + v,
            self.center - u + v,
        ]
    }
}

/// Static, solid collider laid along one border segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticWall {
    pub center: Vec2,
    pub angle: f32,
    pub length: f32,
    pub thickness: f32,
    pub kind: SegmentKind,
}

/// One collider per border segment, in world space
///
/// Goal funnel segments are included (tagged by `kind`) so balls bounce off
/// the funnel sides; zero-length pieces are skipped.
pub fn rebuild_walls(
    segments: &[BorderSegment],
    transform: &WorldTransform,
    thickness: f32,
) -> Vec<StaticWall> {
    segments
        .iter()
        .filter_map(|seg| {
            let p1 = transform.to_world(seg.p1);
            let p2 = transform.to_world(seg.p2);
            let length = (p2 - p1).length();
            if length <= f32::EPSILON {
                return None;
            }
            Some(StaticWall {
                center: (p1 + p2) * 0.5,
                angle: normalize_angle(vec_angle(p2 - p1)),
                length,
                thickness,
                kind: seg.kind,
            })
        })
        .collect()
}

/// Collapse each goal mouth into one sensor tagged with its goal color
///
/// The mouth of a side is the run of consecutive goal segments for that side
/// (post1 -> back1 -> back2 -> post2). Mouths without a goal entry get no
/// sensor.
pub fn rebuild_sensors(
    segments: &[BorderSegment],
    goals: &[Goal],
    transform: &WorldTransform,
) -> Vec<Sensor> {
    let mut sensors = Vec::with_capacity(goals.len());
    let mut i = 0;
    while i < segments.len() {
        let kind = segments[i].kind;
        let SegmentKind::Goal { side } = kind else {
            i += 1;
            continue;
        };
        let end = segments[i..]
            .iter()
            .position(|s| s.kind != kind)
            .map_or(segments.len(), |n| i + n);
        let mouth = &segments[i..end];
        i = end;

        let Some(goal) = goals.iter().find(|g| g.side_index == side) else {
            log::warn!("Goal mouth on side {side} has no goal color, skipping sensor");
            continue;
        };
        sensors.push(mouth_sensor(mouth, goal, transform));
    }
    sensors
}

fn mouth_sensor(mouth: &[BorderSegment], goal: &Goal, transform: &WorldTransform) -> Sensor {
    let first = mouth[0];
    let last = mouth[mouth.len() - 1];
    let (post1, post2) = (first.p1, last.p2);
    let (back1, back2) = (first.p2, last.p1);

    let mid = (post1 + post2) * 0.5;
    let back_mid = (back1 + back2) * 0.5;
    let width = (post2 - post1).length();
    let depth = (back_mid - mid).length();

    Sensor {
        side_index: goal.side_index,
        color: goal.color,
        center: transform.to_world((mid + back_mid) * 0.5),
        angle: normalize_angle(vec_angle(post2 - post1)),
        width: width * transform.scale,
        depth: depth * transform.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::config::ArenaConfig;
    use crate::arena::geometry::build_arena;

    const EPS: f32 = 1e-3;

    fn red() -> ColorId {
        ColorId::new(0xFF0000)
    }

    #[test]
    fn test_transform_roundtrip() {
        let t = WorldTransform::new(Vec2::new(400.0, 300.0), 2.0);
        let local = Vec2::new(-12.5, 40.0);
        assert_eq!(t.to_world(local), Vec2::new(375.0, 380.0));
        assert!((t.to_local(t.to_world(local)) - local).length() < EPS);
    }

    #[test]
    fn test_transform_rejects_degenerate_scale_and_origin() {
        assert!(WorldTransform::default().validate().is_ok());
        for scale in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let err = WorldTransform::new(Vec2::ZERO, scale).validate().unwrap_err();
            assert!(matches!(err, ArenaError::InvalidDimension { field: "scale", .. }));
        }
        let err = WorldTransform::new(Vec2::new(f32::NAN, 0.0), 1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ArenaError::InvalidDimension { field: "origin.x", .. }));
        assert!(WorldTransform::new(Vec2::new(0.0, f32::NEG_INFINITY), 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_sensor_contains_rotated() {
        let sensor = Sensor {
            side_index: 0,
            color: red(),
            center: Vec2::new(10.0, 10.0),
            angle: std::f32::consts::FRAC_PI_2,
            width: 80.0,
            depth: 20.0,
        };
        // Width runs along y after a quarter turn
        assert!(sensor.contains_point(Vec2::new(10.0, 45.0)));
        assert!(!sensor.contains_point(Vec2::new(45.0, 10.0)));
        assert!(sensor.contains_point(Vec2::new(19.0, 10.0)));
    }

    #[test]
    fn test_sensor_corners_are_contained() {
        let sensor = Sensor {
            side_index: 0,
            color: red(),
            center: Vec2::new(-3.0, 7.0),
            angle: 0.7,
            width: 30.0,
            depth: 12.0,
        };
        for corner in sensor.corners() {
            let nudged = corner + (sensor.center - corner) * 0.01;
            assert!(sensor.contains_point(nudged));
        }
    }

    #[test]
    fn test_sensor_sits_over_polygon_mouth() {
        let config = ArenaConfig::polygon(4);
        let goals = [Goal { side_index: 2, color: red() }];
        let geo = build_arena(&config, &goals).unwrap();
        let transform = WorldTransform::new(Vec2::new(100.0, 50.0), 2.0);

        let sensors = rebuild_sensors(&geo.segments, &goals, &transform);
        assert_eq!(sensors.len(), 1);
        let sensor = sensors[0];
        assert_eq!(sensor.side_index, 2);
        assert_eq!(sensor.color, red());
        assert!((sensor.width - config.goal.width * 2.0).abs() < EPS);
        assert!((sensor.depth - config.goal.depth * 2.0).abs() < EPS);

        // Half a depth outward from the side midpoint
        let p1 = geo.vertices[2];
        let p2 = geo.vertices[3];
        let mid = (p1 + p2) * 0.5;
        let expected = mid + mid.normalize() * (config.goal.depth / 2.0);
        assert!((sensor.center - transform.to_world(expected)).length() < EPS);
    }

    #[test]
    fn test_rectangle_sensors_axis_aligned() {
        let config = ArenaConfig::rectangle(3);
        let goals = [
            Goal { side_index: 0, color: red() },
            Goal { side_index: 2, color: ColorId::new(0x0000FF) },
        ];
        let geo = build_arena(&config, &goals).unwrap();
        let sensors = rebuild_sensors(&geo.segments, &goals, &WorldTransform::default());
        assert_eq!(sensors.len(), 2);
        for sensor in &sensors {
            assert!(sensor.angle.abs() < EPS);
            // Above the top edge
            assert!(sensor.center.y < geo.vertices[0].y);
        }
        assert_eq!(sensors[1].color, ColorId::new(0x0000FF));
    }

    #[test]
    fn test_walls_cover_every_segment() {
        let config = ArenaConfig::polygon(5);
        let goals = [Goal { side_index: 0, color: red() }];
        let geo = build_arena(&config, &goals).unwrap();
        let walls = rebuild_walls(&geo.segments, &WorldTransform::default(), 10.0);
        assert_eq!(walls.len(), geo.segments.len());
        assert_eq!(walls.iter().filter(|w| w.kind != SegmentKind::Wall).count(), 3);

        let seg = geo.segments[0];
        let wall = walls[0];
        assert!((wall.center - seg.midpoint()).length() < EPS);
        assert!((wall.length - seg.length()).abs() < EPS);
        assert_eq!(wall.thickness, 10.0);
    }

    #[test]
    fn test_mouth_without_goal_color_has_no_sensor() {
        let config = ArenaConfig::polygon(3);
        let goals = [Goal { side_index: 1, color: red() }];
        let geo = build_arena(&config, &goals).unwrap();
        let sensors = rebuild_sensors(&geo.segments, &[], &WorldTransform::default());
        assert!(sensors.is_empty());
    }
}
