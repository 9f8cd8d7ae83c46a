//! Current board generation
//!
//! A reconfiguration or world move builds a complete new [`ArenaSnapshot`]
//! before swapping it in, so readers only ever see a whole sensor set. Every
//! swap gets a new generation number; work scheduled against an older
//! generation must be dropped by its owner.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::classify::{DropOutcome, classify_drop};
use super::config::{ArenaConfig, ArenaError, ColorId, Goal};
use super::geometry::{ArenaGeometry, build_arena, polygon_area};
use super::registry::{Sensor, StaticWall, WorldTransform, rebuild_sensors, rebuild_walls};
use super::spawn::sample_uniform_point;

/// Everything derived from one config + placement, immutable once built
#[derive(Debug, Clone, Serialize)]
pub struct ArenaSnapshot {
    pub generation: u64,
    pub config: ArenaConfig,
    pub goals: Vec<Goal>,
    /// Local-space outline and segments (for drawing)
    pub geometry: ArenaGeometry,
    pub transform: WorldTransform,
    pub sensors: Vec<Sensor>,
    pub walls: Vec<StaticWall>,
    /// World-space play area
    pub play_area: Vec<Vec2>,
}

impl ArenaSnapshot {
    pub fn build(
        generation: u64,
        config: ArenaConfig,
        goals: Vec<Goal>,
        transform: WorldTransform,
        wall_thickness: f32,
    ) -> Result<Self, ArenaError> {
        transform.validate()?;
        if !(wall_thickness.is_finite() && wall_thickness > 0.0) {
            return Err(ArenaError::InvalidDimension {
                field: "wall_thickness",
                value: wall_thickness,
            });
        }
        let geometry = build_arena(&config, &goals)?;
        let play_area = transform.polygon_to_world(&geometry.play_area);
        let area = polygon_area(&play_area);
        if !(area.is_finite() && area > 0.0) {
            return Err(ArenaError::InvalidDimension {
                field: "play_area",
                value: area,
            });
        }
        let sensors = rebuild_sensors(&geometry.segments, &goals, &transform);
        let walls = rebuild_walls(&geometry.segments, &transform, wall_thickness);
        Ok(Self {
            generation,
            config,
            goals,
            geometry,
            transform,
            sensors,
            walls,
            play_area,
        })
    }

    /// Arena center, world space
    pub fn center(&self) -> Vec2 {
        self.transform.to_world(self.geometry.center())
    }

    pub fn classify(&self, point: Vec2, ball_color: ColorId) -> DropOutcome {
        classify_drop(point, ball_color, &self.sensors, &self.play_area)
    }

    /// Random world-space point inside the play area
    pub fn sample_spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec2> {
        sample_uniform_point(&self.play_area, rng)
    }

    pub fn sensor(&self, side_index: u32) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.side_index == side_index)
    }

    /// Goal colors in side order
    pub fn colors(&self) -> Vec<ColorId> {
        self.goals.iter().map(|g| g.color).collect()
    }

    /// True if the world point lies inside any goal sensor
    pub fn in_goal(&self, point: Vec2) -> bool {
        self.sensors.iter().any(|s| s.contains_point(point))
    }
}

/// Owner of the live snapshot
#[derive(Debug)]
pub struct Board {
    current: Arc<ArenaSnapshot>,
    wall_thickness: f32,
}

impl Board {
    pub fn new(
        config: ArenaConfig,
        goals: Vec<Goal>,
        transform: WorldTransform,
        wall_thickness: f32,
    ) -> Result<Self, ArenaError> {
        let snapshot = ArenaSnapshot::build(0, config, goals, transform, wall_thickness)?;
        Ok(Self {
            current: Arc::new(snapshot),
            wall_thickness,
        })
    }

    /// Cheap handle to the live snapshot
    pub fn snapshot(&self) -> Arc<ArenaSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn current(&self) -> &ArenaSnapshot {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.current.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current.generation == generation
    }

    /// Replace shape and goals; on error the live snapshot is untouched
    pub fn reconfigure(
        &mut self,
        config: ArenaConfig,
        goals: Vec<Goal>,
    ) -> Result<Arc<ArenaSnapshot>, ArenaError> {
        let transform = self.current.transform;
        self.swap(config, goals, transform)
    }

    /// Move or rescale the arena in the world (pan/resize)
    pub fn place(&mut self, transform: WorldTransform) -> Result<Arc<ArenaSnapshot>, ArenaError> {
        let config = self.current.config;
        let goals = self.current.goals.clone();
        self.swap(config, goals, transform)
    }

    /// Squash the live play area to its first vertex, keeping the generation
    #[cfg(test)]
    pub(crate) fn collapse_play_area(&mut self) {
        let mut snapshot = (*self.current).clone();
        let first = snapshot.play_area[0];
        snapshot.play_area.iter_mut().for_each(|p| *p = first);
        self.current = Arc::new(snapshot);
    }

    fn swap(
        &mut self,
        config: ArenaConfig,
        goals: Vec<Goal>,
        transform: WorldTransform,
    ) -> Result<Arc<ArenaSnapshot>, ArenaError> {
        let generation = self.current.generation + 1;
        let snapshot =
            ArenaSnapshot::build(generation, config, goals, transform, self.wall_thickness)?;
        log::info!(
            "Board generation {generation}: {} x{} with {} sensors, {} walls",
            config.shape.as_str(),
            config.sides,
            snapshot.sensors.len(),
            snapshot.walls.len()
        );
        self.current = Arc::new(snapshot);
        Ok(self.snapshot())
    }
}
