//! Game settings
//!
//! Loaded from JSON (a file on native, a string handed over by the page on
//! web). Missing fields fall back to defaults.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::{ArenaConfig, ArenaError, ColorId, GoalStyle, ShapeKind};
use crate::consts::*;

/// Board placement and outline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// Canvas half-size, local units
    pub half_extent: f32,
    pub padding: f32,
    /// Local to world scale
    pub pixel_scale: f32,
    /// Wall collider thickness, world units
    pub wall_thickness: f32,
    /// Minimum wall stretch around rectangle goals
    pub min_goal_gap: f32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            half_extent: DEFAULT_HALF_EXTENT,
            padding: DEFAULT_PADDING,
            pixel_scale: PIXEL_SCALE,
            wall_thickness: WALL_THICKNESS,
            min_goal_gap: RECT_MIN_GOAL_GAP,
        }
    }
}

/// Goal mouth shape plus the dash pattern used to draw it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    pub width: f32,
    pub depth: f32,
    pub chamfer: f32,
    pub dash_length: f32,
    pub gap_length: f32,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            width: GOAL_WIDTH,
            depth: GOAL_DEPTH,
            chamfer: GOAL_CHAMFER,
            dash_length: GOAL_DASH_LENGTH,
            gap_length: GOAL_GAP_LENGTH,
        }
    }
}

/// Ball timings, milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSettings {
    pub drop_ms: u64,
    pub lifespan_ms: u64,
    pub fade_ms: u64,
    pub score_flight_ms: u64,
    pub respawn_delay_ms: u64,
    pub stagger_min_ms: u64,
    pub stagger_max_ms: u64,
    /// Balls on the board at once; 0 means one per goal
    pub max_balls: u32,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            drop_ms: 700,
            lifespan_ms: BALL_LIFESPAN_MS,
            fade_ms: BALL_FADE_MS,
            score_flight_ms: BALL_SCORE_FLIGHT_MS,
            respawn_delay_ms: BALL_RESPAWN_DELAY_MS,
            stagger_min_ms: SPAWN_STAGGER_MIN_MS,
            stagger_max_ms: SPAWN_STAGGER_MAX_MS,
            max_balls: 0,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shape used for the first board
    pub shape: ShapeKind,
    /// Sides (polygon) or goals (rectangle) for the first board
    pub sides: u32,
    pub board: BoardSettings,
    pub goal: GoalSettings,
    pub balls: BallSettings,
    /// Goal colors to draw from
    pub palette: Vec<ColorId>,
    /// Points needed to complete one color
    pub individual_max_score: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Polygon,
            sides: 3,
            board: BoardSettings::default(),
            goal: GoalSettings::default(),
            balls: BallSettings::default(),
            palette: BALL_COLORS
                .iter()
                .filter_map(|c| ColorId::parse(c).ok())
                .collect(),
            individual_max_score: INDIVIDUAL_MAX_SCORE,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON settings file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Arena config for a shape and slot count under these settings
    pub fn arena_config(&self, shape: ShapeKind, sides: u32) -> ArenaConfig {
        ArenaConfig {
            sides,
            shape,
            goal: GoalStyle {
                width: self.goal.width,
                depth: self.goal.depth,
                chamfer: self.goal.chamfer,
            },
            padding: self.board.padding,
            half_extent: self.board.half_extent,
            min_goal_gap: self.board.min_goal_gap,
        }
    }

    /// Ball cap for a board with `goals` goals
    pub fn max_balls(&self, goals: usize) -> usize {
        if self.balls.max_balls == 0 {
            goals
        } else {
            self.balls.max_balls as usize
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.arena_config(self.shape, self.sides).validate()?;
        if !(self.board.pixel_scale.is_finite() && self.board.pixel_scale > 0.0) {
            return Err(SettingsError::Invalid("board.pixel_scale must be > 0"));
        }
        if !(self.board.wall_thickness.is_finite() && self.board.wall_thickness > 0.0) {
            return Err(SettingsError::Invalid("board.wall_thickness must be > 0"));
        }
        if self.palette.is_empty() {
            return Err(SettingsError::Invalid("palette must not be empty"));
        }
        if self.individual_max_score == 0 {
            return Err(SettingsError::Invalid("individual_max_score must be > 0"));
        }
        if self.balls.stagger_min_ms > self.balls.stagger_max_ms {
            return Err(SettingsError::Invalid(
                "balls.stagger_min_ms must be <= balls.stagger_max_ms",
            ));
        }
        Ok(())
    }
}

/// Failure to load or accept settings
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Arena(ArenaError),
    Invalid(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "invalid settings JSON: {e}"),
            Self::Arena(e) => write!(f, "invalid arena settings: {e}"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<ArenaError> for SettingsError {
    fn from(err: ArenaError) -> Self {
        Self::Arena(err)
    }
}
