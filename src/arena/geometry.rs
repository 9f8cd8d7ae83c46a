//! Arena outline and goal-mouth construction
//!
//! All coordinates are local arena space: origin at the arena center, y grows
//! downward (canvas convention), unscaled canvas units. Vertex 0 of a polygon
//! points straight up.
//!
//! A side with a goal is emitted as one continuous path:
//!
//! ```text
//!        back1 ______ back2
//!            /        \          <- goal mouth (dashed, is_goal)
//!   p1 ___ post1      post2 ___ p2
//! ```

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::{ArenaConfig, ArenaError, Goal, GoalStyle, ShapeKind};
use crate::consts::{RECT_HEIGHT_RATIO, RECT_WIDTH_RATIO};
use crate::{cross3, polar_to_cartesian};

/// What a border segment is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SegmentKind {
    /// Solid wall
    Wall,
    /// Part of the funnel of the goal on `side`
    Goal { side: u32 },
}

/// One straight piece of the arena border
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderSegment {
    pub p1: Vec2,
    pub p2: Vec2,
    /// Outline edge this piece belongs to (polygon side, or rectangle edge
    /// numbered top, right, bottom, left)
    pub edge: u32,
    pub kind: SegmentKind,
}

impl BorderSegment {
    fn wall(p1: Vec2, p2: Vec2, edge: u32) -> Self {
        Self {
            p1,
            p2,
            edge,
            kind: SegmentKind::Wall,
        }
    }

    fn goal(p1: Vec2, p2: Vec2, edge: u32, side: u32) -> Self {
        Self {
            p1,
            p2,
            edge,
            kind: SegmentKind::Goal { side },
        }
    }

    #[inline]
    pub fn is_goal(&self) -> bool {
        matches!(self.kind, SegmentKind::Goal { .. })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.p2 - self.p1).length()
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }
}

/// Generated board, local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaGeometry {
    pub shape: ShapeKind,
    /// Outline corners in winding order (closed ring)
    pub vertices: Vec<Vec2>,
    /// Border pieces in path order around the ring
    pub segments: Vec<BorderSegment>,
    /// Interior boundary used for containment and spawning
    pub play_area: Vec<Vec2>,
}

impl ArenaGeometry {
    /// Arena center, local space
    pub fn center(&self) -> Vec2 {
        Vec2::ZERO
    }

    pub fn goal_segments(&self) -> impl Iterator<Item = &BorderSegment> {
        self.segments.iter().filter(|s| s.is_goal())
    }
}

/// Build the outline, border segments and play area for a config
pub fn build_arena(config: &ArenaConfig, goals: &[Goal]) -> Result<ArenaGeometry, ArenaError> {
    config.validate()?;
    config.validate_goals(goals)?;

    let geometry = match config.shape {
        ShapeKind::Polygon => build_polygon(config, goals),
        ShapeKind::Rectangle => build_rectangle(config, goals),
    };
    log::debug!(
        "Built {} arena: {} sides, {} goals, {} segments",
        config.shape.as_str(),
        config.sides,
        goals.len(),
        geometry.segments.len()
    );
    Ok(geometry)
}

/// Circumradius of the polygon board
///
/// Prefers the radius whose apothem leaves room for the goal depth, capped so
/// the outline itself stays on the canvas. Never smaller than the radius at
/// which a side is exactly one goal wide.
pub fn polygon_radius(config: &ArenaConfig) -> f32 {
    let n = config.sides.max(3) as f32;
    let apothem = config.half_extent - config.goal.depth - config.padding;
    let max_fit = config.half_extent - config.padding;
    let radius = (apothem / (PI / n).cos()).min(max_fit);

    let min_viable = config.goal.width / (2.0 * (PI / n).sin());
    if radius.is_finite() && radius >= min_viable {
        radius
    } else {
        log::warn!(
            "Polygon radius {radius} too small for {} sides, clamping to {min_viable}",
            config.sides
        );
        min_viable
    }
}

/// Outline width and height of the rectangle board
pub fn rectangle_size(config: &ArenaConfig) -> Vec2 {
    let n = config.sides as f32;
    let canvas = config.half_extent * 2.0;
    let min_width = n * config.goal.width + config.min_goal_gap * (n + 1.0);
    let width = min_width.max(canvas * RECT_WIDTH_RATIO);

    let height = canvas * RECT_HEIGHT_RATIO - config.padding * 2.0;
    if height > config.goal.depth {
        Vec2::new(width, height)
    } else {
        log::warn!("Rectangle height {height} too small, clamping to goal depth");
        Vec2::new(width, config.goal.depth)
    }
}

/// Wall stretch before, between and after rectangle goal slots
pub fn rectangle_gap(width: f32, slots: u32, goal_width: f32) -> f32 {
    (width - slots as f32 * goal_width) / (slots as f32 + 1.0)
}

fn build_polygon(config: &ArenaConfig, goals: &[Goal]) -> ArenaGeometry {
    let sides = config.sides;
    let radius = polygon_radius(config);
    let center = Vec2::ZERO;

    let vertices: Vec<Vec2> = (0..sides)
        .map(|i| {
            let angle = (i as f32 / sides as f32) * TAU - PI / 2.0;
            center + polar_to_cartesian(radius, angle)
        })
        .collect();

    let mut segments = Vec::with_capacity(sides as usize * 5);
    for i in 0..sides {
        let p1 = vertices[i as usize];
        let p2 = vertices[((i + 1) % sides) as usize];

        if !goals.iter().any(|g| g.side_index == i) {
            segments.push(BorderSegment::wall(p1, p2, i));
            continue;
        }

        let mid = (p1 + p2) * 0.5;
        let normal = (mid - center).normalize_or_zero();
        let tangent = (p2 - p1).normalize_or_zero();
        let half = tangent * (config.goal.width / 2.0);
        let post1 = mid - half;
        let post2 = mid + half;

        segments.push(BorderSegment::wall(p1, post1, i));
        push_mouth(&mut segments, post1, post2, normal, tangent, &config.goal, i, i);
        segments.push(BorderSegment::wall(post2, p2, i));
    }

    ArenaGeometry {
        shape: ShapeKind::Polygon,
        play_area: vertices.clone(),
        vertices,
        segments,
    }
}

fn build_rectangle(config: &ArenaConfig, goals: &[Goal]) -> ArenaGeometry {
    let size = rectangle_size(config);
    let (hw, hh) = (size.x / 2.0, size.y / 2.0);
    let top_left = Vec2::new(-hw, -hh);
    let top_right = Vec2::new(hw, -hh);
    let bottom_right = Vec2::new(hw, hh);
    let bottom_left = Vec2::new(-hw, hh);

    let slots = config.sides;
    let goal_width = config.goal.width;
    let gap = rectangle_gap(size.x, slots, goal_width);
    // Top edge opens upward
    let normal = Vec2::new(0.0, -1.0);
    let tangent = Vec2::X;

    let mut segments = Vec::with_capacity(slots as usize * 4 + 4);
    let mut cursor = top_left;
    for slot in 0..slots {
        if !goals.iter().any(|g| g.side_index == slot) {
            continue;
        }
        let x = top_left.x + gap * (slot + 1) as f32 + goal_width * slot as f32;
        let post1 = Vec2::new(x, top_left.y);
        let post2 = Vec2::new(x + goal_width, top_left.y);

        segments.push(BorderSegment::wall(cursor, post1, 0));
        push_mouth(&mut segments, post1, post2, normal, tangent, &config.goal, 0, slot);
        cursor = post2;
    }
    segments.push(BorderSegment::wall(cursor, top_right, 0));
    segments.push(BorderSegment::wall(top_right, bottom_right, 1));
    segments.push(BorderSegment::wall(bottom_right, bottom_left, 2));
    segments.push(BorderSegment::wall(bottom_left, top_left, 3));

    let vertices = vec![top_left, top_right, bottom_right, bottom_left];
    ArenaGeometry {
        shape: ShapeKind::Rectangle,
        play_area: vertices.clone(),
        vertices,
        segments,
    }
}

/// Funnel from post1 out to the back wall and back in to post2
#[allow(clippy::too_many_arguments)]
fn push_mouth(
    segments: &mut Vec<BorderSegment>,
    post1: Vec2,
    post2: Vec2,
    normal: Vec2,
    tangent: Vec2,
    style: &GoalStyle,
    edge: u32,
    side: u32,
) {
    let back1 = post1 + normal * style.depth + tangent * style.chamfer;
    let back2 = post2 + normal * style.depth - tangent * style.chamfer;
    segments.push(BorderSegment::goal(post1, back1, edge, side));
    segments.push(BorderSegment::goal(back1, back2, edge, side));
    segments.push(BorderSegment::goal(back2, post2, edge, side));
}

/// Absolute area of a simple polygon (shoelace)
pub fn polygon_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let origin = points[0];
    let twice: f32 = points
        .windows(2)
        .skip(1)
        .map(|w| cross3(origin, w[0], w[1]))
        .sum();
    twice.abs() / 2.0
}
