//! Goal Drop - a color-sorting arena arcade game
//!
//! Core modules:
//! - `arena`: Arena geometry, goal sensors, drop classification, spawn sampling
//! - `ball`: Ball records and their lifecycle
//! - `outline`: Border lines and dash pattern for a host renderer
//! - `scoreboard`: Per-color tallies and drop accuracy
//! - `session`: Event-driven glue between the board, balls and scores
//! - `settings`: Data-driven board and game configuration
//! - `platform`: Browser bindings

pub mod arena;
pub mod ball;
pub mod outline;
pub mod platform;
pub mod scoreboard;
pub mod session;
pub mod settings;

pub use scoreboard::ScoreBoard;
pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Canvas half-size in local (unscaled) units
    pub const DEFAULT_HALF_EXTENT: f32 = 250.0;
    /// Gap between the arena and the canvas edge
    pub const DEFAULT_PADDING: f32 = 10.0;
    /// Local to world scale (pixel-art upscaling)
    pub const PIXEL_SCALE: f32 = 2.0;
    /// Collider thickness for static walls, world units
    pub const WALL_THICKNESS: f32 = 10.0;

    /// Goal mouth defaults
    pub const GOAL_WIDTH: f32 = 80.0;
    pub const GOAL_DEPTH: f32 = 40.0;
    pub const GOAL_CHAMFER: f32 = 18.0;
    pub const GOAL_DASH_LENGTH: f32 = 2.0;
    pub const GOAL_GAP_LENGTH: f32 = 6.0;

    /// Rectangle boards
    pub const RECT_MIN_GOAL_GAP: f32 = 20.0;
    pub const RECT_WIDTH_RATIO: f32 = 0.8;
    pub const RECT_HEIGHT_RATIO: f32 = 0.7;

    /// Ball timings (milliseconds)
    pub const BALL_LIFESPAN_MS: u64 = 120_000;
    pub const BALL_FADE_MS: u64 = 1_500;
    pub const BALL_RESPAWN_DELAY_MS: u64 = 1_000;
    pub const BALL_SCORE_FLIGHT_MS: u64 = 1_200;
    pub const SPAWN_STAGGER_MIN_MS: u64 = 1_000;
    pub const SPAWN_STAGGER_MAX_MS: u64 = 2_000;
    /// Retry delay when no spawn point is available
    pub const SPAWN_RETRY_MS: u64 = 50;

    /// Points needed to complete a single color
    pub const INDIVIDUAL_MAX_SCORE: u32 = 20;

    /// Master list of ball colors
    pub const BALL_COLORS: [&str; 7] = [
        "#FF0000", // Red
        "#FFA500", // Orange
        "#FFFF00", // Yellow
        "#00FF00", // Green
        "#0000FF", // Blue
        "#4B0082", // Indigo
        "#EE82EE", // Violet
    ];
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading of a vector in radians
#[inline]
pub fn vec_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Twice the signed area of triangle (a, b, c)
#[inline]
pub fn cross3(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) - -PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cross3_orientation() {
        let a = Vec2::ZERO;
        let b = Vec2::new(1.0, 0.0);
        let c = Vec2::new(0.0, 1.0);
        assert!((cross3(a, b, c) - 1.0).abs() < 1e-6);
        assert!((cross3(a, c, b) + 1.0).abs() < 1e-6);
    }
}
