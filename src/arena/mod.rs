//! Arena geometry and drop handling
//!
//! Pure and engine-free:
//! - No rendering or physics dependencies
//! - Walls and sensors are plain records handed to the host engine
//! - Randomness only through a caller-supplied RNG

pub mod board;
pub mod classify;
pub mod config;
pub mod geometry;
pub mod registry;
pub mod spawn;

pub use board::{ArenaSnapshot, Board};
pub use classify::{DropOutcome, classify_drop, point_in_polygon};
pub use config::{ArenaConfig, ArenaError, ColorId, Goal, GoalStyle, ShapeKind, assign_goals};
pub use geometry::{
    ArenaGeometry, BorderSegment, SegmentKind, build_arena, polygon_area, polygon_radius,
    rectangle_gap, rectangle_size,
};
pub use registry::{Sensor, StaticWall, WorldTransform, rebuild_sensors, rebuild_walls};
pub use spawn::{sample_point_or_first_vertex, sample_uniform_point};
