//! Arena configuration, goal assignment and validation
//!
//! An [`ArenaConfig`] is immutable for the lifetime of one board; any change
//! (shape, side count, goal style) produces a fresh config and a full rebuild.

use std::error::Error;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Board outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Regular N-gon, one goal slot per side
    #[default]
    Polygon,
    /// Fixed rectangle, N goal slots along the top edge
    Rectangle,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rectangle => "rectangle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "polygon" | "poly" => Some(ShapeKind::Polygon),
            "rectangle" | "rect" => Some(ShapeKind::Rectangle),
            _ => None,
        }
    }

    /// Smallest slot count that yields a playable board
    pub fn min_sides(&self) -> u32 {
        match self {
            ShapeKind::Polygon => 3,
            ShapeKind::Rectangle => 2,
        }
    }
}

/// A ball/goal color, stored as packed 0xRRGGBB
///
/// Serialized as a `#RRGGBB` string. Only the low 24 bits are kept, so two
/// colors that print the same always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorId(u32);

impl ColorId {
    pub const fn new(rgb: u32) -> Self {
        ColorId(rgb & 0xFF_FFFF)
    }

    /// Packed 0xRRGGBB
    pub const fn value(&self) -> u32 {
        self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }

    pub fn parse(s: &str) -> Result<Self, ArenaError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ArenaError::InvalidColor(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(ColorId::new)
            .map_err(|_| ArenaError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl TryFrom<String> for ColorId {
    type Error = ArenaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ColorId::parse(&value)
    }
}

impl From<ColorId> for String {
    fn from(color: ColorId) -> Self {
        color.to_string()
    }
}

/// A goal mouth cut into one side (or rectangle slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub side_index: u32,
    pub color: ColorId,
}

/// Goal mouth dimensions, local units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalStyle {
    pub width: f32,
    pub depth: f32,
    /// Inward cut at the back of the funnel, per side
    pub chamfer: f32,
}

impl Default for GoalStyle {
    fn default() -> Self {
        Self {
            width: GOAL_WIDTH,
            depth: GOAL_DEPTH,
            chamfer: GOAL_CHAMFER,
        }
    }
}

/// Everything the geometry builder needs for one board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Polygon side count, or goal slot count for rectangles
    pub sides: u32,
    pub shape: ShapeKind,
    pub goal: GoalStyle,
    pub padding: f32,
    /// Half the drawable canvas, local units
    pub half_extent: f32,
    /// Minimum wall stretch around rectangle goals
    pub min_goal_gap: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            sides: 3,
            shape: ShapeKind::Polygon,
            goal: GoalStyle::default(),
            padding: DEFAULT_PADDING,
            half_extent: DEFAULT_HALF_EXTENT,
            min_goal_gap: RECT_MIN_GOAL_GAP,
        }
    }
}

impl ArenaConfig {
    pub fn polygon(sides: u32) -> Self {
        Self {
            sides,
            shape: ShapeKind::Polygon,
            ..Default::default()
        }
    }

    pub fn rectangle(goals: u32) -> Self {
        Self {
            sides: goals,
            shape: ShapeKind::Rectangle,
            ..Default::default()
        }
    }

    /// Reject configs that would produce degenerate geometry
    pub fn validate(&self) -> Result<(), ArenaError> {
        let min = self.shape.min_sides();
        if self.sides < min {
            return Err(ArenaError::TooFewSides {
                shape: self.shape,
                sides: self.sides,
                min,
            });
        }
        positive("goal.width", self.goal.width)?;
        positive("goal.depth", self.goal.depth)?;
        positive("half_extent", self.half_extent)?;
        non_negative("goal.chamfer", self.goal.chamfer)?;
        non_negative("padding", self.padding)?;
        non_negative("min_goal_gap", self.min_goal_gap)?;
        if self.goal.chamfer * 2.0 >= self.goal.width {
            return Err(ArenaError::ChamferTooWide {
                chamfer: self.goal.chamfer,
                width: self.goal.width,
            });
        }
        Ok(())
    }

    /// Check a goal list against this config
    pub fn validate_goals(&self, goals: &[Goal]) -> Result<(), ArenaError> {
        let mut seen = vec![false; self.sides as usize];
        for goal in goals {
            let slot = seen
                .get_mut(goal.side_index as usize)
                .ok_or(ArenaError::GoalOutOfRange {
                    side_index: goal.side_index,
                    sides: self.sides,
                })?;
            if *slot {
                return Err(ArenaError::DuplicateGoal(goal.side_index));
            }
            *slot = true;
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ArenaError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArenaError::InvalidDimension { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ArenaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ArenaError::InvalidDimension { field, value })
    }
}

/// Shuffle the palette and hand one color to each side, in side order
///
/// Sides beyond the palette length get no goal and stay solid.
pub fn assign_goals<R: Rng + ?Sized>(sides: u32, palette: &[ColorId], rng: &mut R) -> Vec<Goal> {
    let mut colors = palette.to_vec();
    colors.shuffle(rng);
    colors
        .into_iter()
        .take(sides as usize)
        .enumerate()
        .map(|(i, color)| Goal {
            side_index: i as u32,
            color,
        })
        .collect()
}

/// Invalid arena input, caught before any geometry is built
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaError {
    TooFewSides { shape: ShapeKind, sides: u32, min: u32 },
    InvalidDimension { field: &'static str, value: f32 },
    ChamferTooWide { chamfer: f32, width: f32 },
    GoalOutOfRange { side_index: u32, sides: u32 },
    DuplicateGoal(u32),
    InvalidColor(String),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSides { shape, sides, min } => {
                write!(f, "{} needs at least {min} sides, got {sides}", shape.as_str())
            }
            Self::InvalidDimension { field, value } => {
                write!(f, "{field} has invalid value {value}")
            }
            Self::ChamferTooWide { chamfer, width } => {
                write!(f, "chamfer {chamfer} closes a goal mouth of width {width}")
            }
            Self::GoalOutOfRange { side_index, sides } => {
                write!(f, "goal on side {side_index} but board has {sides} sides")
            }
            Self::DuplicateGoal(side) => write!(f, "side {side} has more than one goal"),
            Self::InvalidColor(s) => write!(f, "invalid color {s:?}, expected #RRGGBB"),
        }
    }
}

impl Error for ArenaError {}
