//! Per-color scores and drop accuracy
//!
//! Reset on every board change. The game is complete once every goal color
//! has reached its individual maximum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arena::{ColorId, DropOutcome};

/// Score state for the current board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Points per goal color
    pub tallies: BTreeMap<ColorId, u32>,
    /// Points needed to complete one color
    pub individual_max: u32,
    pub correct_drops: u32,
    pub incorrect_drops: u32,
}

impl ScoreBoard {
    pub fn new(colors: &[ColorId], individual_max: u32) -> Self {
        Self {
            tallies: colors.iter().map(|&c| (c, 0)).collect(),
            individual_max,
            correct_drops: 0,
            incorrect_drops: 0,
        }
    }

    /// Start over with a new color set
    pub fn reset(&mut self, colors: &[ColorId]) {
        *self = Self::new(colors, self.individual_max);
    }

    /// Tally a drop for accuracy; valid-area drops count neither way
    pub fn record_drop(&mut self, outcome: DropOutcome) {
        match outcome {
            DropOutcome::Correct { .. } => self.correct_drops += 1,
            DropOutcome::WrongGoal { .. } | DropOutcome::Invalid => self.incorrect_drops += 1,
            DropOutcome::ValidArea => {}
        }
    }

    /// Add a point once the scoring animation lands
    ///
    /// Returns the new tally, or None for a color not on this board.
    pub fn add_point(&mut self, color: ColorId) -> Option<u32> {
        let max = self.individual_max;
        let score = self.tallies.get_mut(&color)?;
        *score = (*score + 1).min(max);
        Some(*score)
    }

    pub fn score(&self, color: ColorId) -> u32 {
        self.tallies.get(&color).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.tallies.values().sum()
    }

    pub fn total_max(&self) -> u32 {
        self.tallies.len() as u32 * self.individual_max
    }

    /// Overall progress in [0, 1]
    pub fn progress(&self) -> f32 {
        let max = self.total_max();
        if max == 0 {
            return 0.0;
        }
        (self.total() as f32 / max as f32).min(1.0)
    }

    /// Correct share of goal/invalid drops in [0, 1]; 0 before any drop
    pub fn accuracy(&self) -> f32 {
        let attempts = self.correct_drops + self.incorrect_drops;
        if attempts == 0 {
            0.0
        } else {
            self.correct_drops as f32 / attempts as f32
        }
    }

    /// Colors still worth spawning, in color order
    pub fn available_colors(&self) -> Vec<ColorId> {
        self.tallies
            .iter()
            .filter(|&(_, &score)| score < self.individual_max)
            .map(|(&color, _)| color)
            .collect()
    }

    /// Every color maxed out
    pub fn is_complete(&self) -> bool {
        !self.tallies.is_empty() && self.total() >= self.total_max()
    }
}
