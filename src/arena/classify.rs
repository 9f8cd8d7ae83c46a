//! Drop classification
//!
//! Decides what happens to a ball released at a point. Goal sensors protrude
//! past the play-area boundary, so they are tested first and independently of
//! the play area.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::ColorId;
use super::registry::Sensor;

/// Result of releasing a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Dropped in the goal of its own color
    Correct { side_index: u32 },
    /// Dropped in a goal of another color
    WrongGoal { side_index: u32 },
    /// Dropped inside the arena, away from any goal
    ValidArea,
    /// Dropped anywhere else
    Invalid,
}

impl DropOutcome {
    /// Counts against accuracy
    pub fn is_miss(&self) -> bool {
        matches!(self, DropOutcome::WrongGoal { .. } | DropOutcome::Invalid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DropOutcome::Correct { .. } => "correct",
            DropOutcome::WrongGoal { .. } => "wrong_goal",
            DropOutcome::ValidArea => "valid_area",
            DropOutcome::Invalid => "invalid",
        }
    }
}

/// Classify a drop; first matching rule wins
///
/// 1. inside a sensor: `Correct` if colors match, else `WrongGoal`
/// 2. inside the play area: `ValidArea`
/// 3. otherwise `Invalid`
///
/// Sensors are scanned in order, so overlapping sensors resolve to the first.
pub fn classify_drop(
    point: Vec2,
    ball_color: ColorId,
    sensors: &[Sensor],
    play_area: &[Vec2],
) -> DropOutcome {
    if let Some(sensor) = sensors.iter().find(|s| s.contains_point(point)) {
        return if sensor.color == ball_color {
            DropOutcome::Correct {
                side_index: sensor.side_index,
            }
        } else {
            DropOutcome::WrongGoal {
                side_index: sensor.side_index,
            }
        };
    }

    if point_in_polygon(point, play_area) {
        DropOutcome::ValidArea
    } else {
        DropOutcome::Invalid
    }
}

/// Even-odd ray casting; false for fewer than three vertices
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(-100.0, -100.0),
            Vec2::new(100.0, -100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(-100.0, 100.0),
        ]
    }

    fn sensor(color: u32, center: Vec2, side_index: u32) -> Sensor {
        Sensor {
            side_index,
            color: ColorId::new(color),
            center,
            angle: 0.0,
            width: 80.0,
            depth: 40.0,
        }
    }

    #[test]
    fn test_point_in_polygon_square() {
        let sq = square();
        assert!(point_in_polygon(Vec2::ZERO, &sq));
        assert!(point_in_polygon(Vec2::new(99.0, -99.0), &sq));
        assert!(!point_in_polygon(Vec2::new(101.0, 0.0), &sq));
        assert!(!point_in_polygon(Vec2::new(0.0, -150.0), &sq));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // L shape
        let l = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!(point_in_polygon(Vec2::new(0.5, 1.5), &l));
        assert!(!point_in_polygon(Vec2::new(1.5, 1.5), &l));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        assert!(!point_in_polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::X]));
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
    }

    #[test]
    fn test_goal_beats_play_area() {
        // Sensor straddles the top edge of the square
        let sensors = [sensor(0xFF0000, Vec2::new(0.0, -100.0), 0)];
        let inside_both = Vec2::new(0.0, -95.0);
        assert_eq!(
            classify_drop(inside_both, ColorId::new(0xFF0000), &sensors, &square()),
            DropOutcome::Correct { side_index: 0 }
        );
        assert_eq!(
            classify_drop(inside_both, ColorId::new(0x00FF00), &sensors, &square()),
            DropOutcome::WrongGoal { side_index: 0 }
        );
    }

    #[test]
    fn test_sensor_outside_play_area_still_counts() {
        let sensors = [sensor(0xFF0000, Vec2::new(0.0, -130.0), 0)];
        assert_eq!(
            classify_drop(Vec2::new(10.0, -140.0), ColorId::new(0xFF0000), &sensors, &square()),
            DropOutcome::Correct { side_index: 0 }
        );
    }

    #[test]
    fn test_valid_area_and_invalid() {
        let sensors = [sensor(0xFF0000, Vec2::new(0.0, -130.0), 0)];
        let red = ColorId::new(0xFF0000);
        assert_eq!(
            classify_drop(Vec2::new(20.0, 30.0), red, &sensors, &square()),
            DropOutcome::ValidArea
        );
        assert_eq!(
            classify_drop(Vec2::new(-1000.0, -1000.0), red, &sensors, &square()),
            DropOutcome::Invalid
        );
        assert_eq!(
            classify_drop(Vec2::ZERO, red, &[], &[]),
            DropOutcome::Invalid
        );
    }

    #[test]
    fn test_misses() {
        assert!(DropOutcome::Invalid.is_miss());
        assert!(DropOutcome::WrongGoal { side_index: 1 }.is_miss());
        assert!(!DropOutcome::ValidArea.is_miss());
        assert!(!DropOutcome::Correct { side_index: 1 }.is_miss());
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(
            x in -300.0f32..300.0,
            y in -300.0f32..300.0,
            color in 0u32..4,
        ) {
            let sensors = [
                sensor(0, Vec2::new(0.0, -120.0), 0),
                sensor(1, Vec2::new(120.0, 0.0), 1),
            ];
            let p = Vec2::new(x, y);
            let a = classify_drop(p, ColorId::new(color), &sensors, &square());
            let b = classify_drop(p, ColorId::new(color), &sensors, &square());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_inside_sensor_correct_only_for_its_color(
            dx in -39.0f32..39.0,
            dy in -19.0f32..19.0,
            color in 0u32..16,
        ) {
            let sensors = [
                sensor(3, Vec2::new(0.0, -120.0), 0),
                sensor(7, Vec2::new(300.0, 0.0), 1),
            ];
            let p = sensors[0].center + Vec2::new(dx, dy);
            let outcome = classify_drop(p, ColorId::new(color), &sensors, &square());
            if color == 3 {
                prop_assert_eq!(outcome, DropOutcome::Correct { side_index: 0 });
            } else {
                prop_assert_eq!(outcome, DropOutcome::WrongGoal { side_index: 0 });
            }
        }
    }
}
