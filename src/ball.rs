//! Ball records and their lifecycle
//!
//! ```text
//! Falling -> Settled <-> Dragging -> Scoring -> (removed)
//!               |                 -> Settled (valid area / returned to center)
//!               +-> Fading -> (removed)
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::{ColorId, DropOutcome};
use crate::settings::BallSettings;

/// Where a ball is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Drop-in animation toward its spawn point
    Falling,
    /// Free in the arena, physics-driven
    Settled,
    /// Held by the pointer
    Dragging,
    /// Flying to the scoreboard after a correct drop
    Scoring { side_index: u32 },
    /// Lifespan over or game ended
    Fading,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub color: ColorId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: BallState,
    /// Board generation the ball was spawned under
    pub generation: u64,
    /// End of the current timed state (falling, scoring, fading)
    pub deadline_ms: Option<u64>,
    /// When a settled ball starts fading
    pub expires_at_ms: Option<u64>,
}

impl Ball {
    /// Spawn a ball dropping toward `target`
    pub fn spawn(
        id: u32,
        color: ColorId,
        target: Vec2,
        generation: u64,
        now_ms: u64,
        timings: &BallSettings,
    ) -> Self {
        Self {
            id,
            color,
            pos: target,
            vel: Vec2::ZERO,
            state: BallState::Falling,
            generation,
            deadline_ms: Some(now_ms.saturating_add(timings.drop_ms)),
            expires_at_ms: None,
        }
    }

    /// Finish the drop-in and start the lifespan clock
    pub fn land(&mut self, now_ms: u64, timings: &BallSettings) {
        if self.state == BallState::Falling {
            self.state = BallState::Settled;
            self.deadline_ms = None;
            self.expires_at_ms = Some(now_ms.saturating_add(timings.lifespan_ms));
        }
    }

    /// Only settled balls can be picked up
    pub fn can_drag(&self) -> bool {
        self.state == BallState::Settled
    }

    pub fn begin_drag(&mut self) -> bool {
        if !self.can_drag() {
            return false;
        }
        self.state = BallState::Dragging;
        self.vel = Vec2::ZERO;
        true
    }

    /// Move a held ball
    pub fn drag_to(&mut self, pos: Vec2) {
        if self.state == BallState::Dragging {
            self.pos = pos;
        }
    }

    /// Apply a classified release
    ///
    /// Misses are sent back to `center`; if there is none the ball fades.
    pub fn release(
        &mut self,
        outcome: DropOutcome,
        center: Option<Vec2>,
        now_ms: u64,
        timings: &BallSettings,
    ) {
        self.vel = Vec2::ZERO;
        match outcome {
            DropOutcome::Correct { side_index } => {
                self.state = BallState::Scoring { side_index };
                self.deadline_ms = Some(now_ms.saturating_add(timings.score_flight_ms));
                self.expires_at_ms = None;
            }
            DropOutcome::ValidArea => {
                self.state = BallState::Settled;
            }
            DropOutcome::WrongGoal { .. } | DropOutcome::Invalid => match center {
                Some(center) => {
                    self.pos = center;
                    self.state = BallState::Settled;
                }
                None => self.fade(now_ms, timings),
            },
        }
    }

    /// Start fading out (no-op if already leaving)
    pub fn fade(&mut self, now_ms: u64, timings: &BallSettings) {
        if self.is_leaving() {
            return;
        }
        self.state = BallState::Fading;
        self.deadline_ms = Some(now_ms.saturating_add(timings.fade_ms));
        self.expires_at_ms = None;
    }

    /// Scoring or fading; will be removed
    pub fn is_leaving(&self) -> bool {
        matches!(self.state, BallState::Scoring { .. } | BallState::Fading)
    }

    /// The timed state has run out
    pub fn deadline_passed(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|d| now_ms >= d)
    }

    /// Settled too long
    pub fn expired(&self, now_ms: u64) -> bool {
        self.state == BallState::Settled && self.expires_at_ms.is_some_and(|t| now_ms >= t)
    }
}
