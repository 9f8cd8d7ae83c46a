//! Board outline for a host renderer
//!
//! World-space border lines: walls drawn solid, goal mouths dashed in the
//! goal's color.

use glam::Vec2;
use serde::Serialize;

use crate::arena::{ArenaSnapshot, ColorId, SegmentKind};
use crate::settings::GoalSettings;

/// One border line, world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlineLine {
    pub from: Vec2,
    pub to: Vec2,
    /// Goal color; None for plain walls
    pub color: Option<ColorId>,
    pub dashed: bool,
}

/// Everything needed to draw the board border
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    pub generation: u64,
    pub lines: Vec<OutlineLine>,
    /// World-space dash pattern for goal lines
    pub dash_length: f32,
    pub gap_length: f32,
}

impl Outline {
    pub fn from_snapshot(snapshot: &ArenaSnapshot, goal: &GoalSettings) -> Self {
        let t = &snapshot.transform;
        let lines = snapshot
            .geometry
            .segments
            .iter()
            .map(|seg| {
                let color = match seg.kind {
                    SegmentKind::Goal { side } => snapshot
                        .goals
                        .iter()
                        .find(|g| g.side_index == side)
                        .map(|g| g.color),
                    SegmentKind::Wall => None,
                };
                OutlineLine {
                    from: t.to_world(seg.p1),
                    to: t.to_world(seg.p2),
                    color,
                    dashed: seg.is_goal(),
                }
            })
            .collect();

        Self {
            generation: snapshot.generation,
            lines,
            dash_length: goal.dash_length * t.scale,
            gap_length: goal.gap_length * t.scale,
        }
    }

    /// Split every dashed line into its visible pieces
    pub fn dash_pieces(&self) -> Vec<(Vec2, Vec2, Option<ColorId>)> {
        let mut pieces = Vec::new();
        for line in &self.lines {
            if !line.dashed {
                pieces.push((line.from, line.to, line.color));
                continue;
            }
            for (a, b) in dashes(line.from, line.to, self.dash_length, self.gap_length) {
                pieces.push((a, b, line.color));
            }
        }
        pieces
    }
}

/// Dash pieces along `from -> to`, last dash clipped at the end
fn dashes(from: Vec2, to: Vec2, dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let length = from.distance(to);
    let period = dash + gap;
    if length <= 0.0 || dash <= 0.0 || period <= 0.0 {
        return vec![(from, to)];
    }

    let dir = (to - from) / length;
    let mut out = Vec::with_capacity((length / period).ceil() as usize);
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        out.push((from + dir * start, from + dir * end));
        start += period;
    }
    out
}
