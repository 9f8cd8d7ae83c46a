//! Game session: board, balls, scores and spawn timers
//!
//! Turns host events (reconfigure, resize, drag, release, frame time) into
//! calls on the arena core. Single-threaded and clock-driven: the host passes
//! the current time in milliseconds to [`Session::advance`] once per frame.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::arena::{
    ArenaError, ArenaSnapshot, Board, ColorId, DropOutcome, ShapeKind, WorldTransform,
    assign_goals,
};
use crate::ball::{Ball, BallState};
use crate::consts::SPAWN_RETRY_MS;
use crate::scoreboard::ScoreBoard;
use crate::settings::{Settings, SettingsError};

/// Something the host should react to (sound, animation, UI)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    BoardChanged { generation: u64 },
    BallSpawned { id: u32, color: ColorId, target: Vec2 },
    BallLanded { id: u32 },
    Dropped { id: u32, outcome: DropOutcome },
    /// Missed drop sent back to the arena center
    BallReturned { id: u32, pos: Vec2 },
    PointScored { color: ColorId, score: u32 },
    BallFading { id: u32 },
    BallRemoved { id: u32 },
    GameOver,
}

/// A pending spawn, valid only for the generation it was scheduled under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpawnTimer {
    due_ms: u64,
    generation: u64,
}

/// Session-level failures
#[derive(Debug)]
pub enum SessionError {
    Arena(ArenaError),
    Settings(SettingsError),
    /// Event refers to a board that has since been replaced
    StaleGeneration { event: u64, current: u64 },
    UnknownBall(u32),
    NotDraggable(u32),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "{e}"),
            Self::Settings(e) => write!(f, "{e}"),
            Self::StaleGeneration { event, current } => {
                write!(f, "event for board generation {event}, current is {current}")
            }
            Self::UnknownBall(id) => write!(f, "no ball with id {id}"),
            Self::NotDraggable(id) => write!(f, "ball {id} cannot be dragged now"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Settings(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for SessionError {
    fn from(err: ArenaError) -> Self {
        Self::Arena(err)
    }
}

impl From<SettingsError> for SessionError {
    fn from(err: SettingsError) -> Self {
        Self::Settings(err)
    }
}

/// One player's game
pub struct Session {
    settings: Settings,
    board: Board,
    scores: ScoreBoard,
    balls: Vec<Ball>,
    timers: Vec<SpawnTimer>,
    rng: Pcg32,
    next_id: u32,
    now_ms: u64,
    game_over: bool,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Start a session with the shape from `settings`, centered at `origin`
    pub fn new(settings: Settings, seed: u64, origin: Vec2) -> Result<Self, SessionError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let config = settings.arena_config(settings.shape, settings.sides);
        let goals = assign_goals(config.sides, &settings.palette, &mut rng);
        let transform = WorldTransform::new(origin, settings.board.pixel_scale);
        let board = Board::new(config, goals, transform, settings.board.wall_thickness)?;
        let scores = ScoreBoard::new(&board.current().colors(), settings.individual_max_score);

        let mut session = Self {
            settings,
            board,
            scores,
            balls: Vec::new(),
            timers: Vec::new(),
            rng,
            next_id: 1,
            now_ms: 0,
            game_over: false,
            events: Vec::new(),
        };
        session.schedule_initial_spawns();
        Ok(session)
    }

    pub fn snapshot(&self) -> Arc<ArenaSnapshot> {
        self.board.snapshot()
    }

    pub fn generation(&self) -> u64 {
        self.board.generation()
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Latest time seen by [`Session::advance`]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Spawns waiting to fire
    pub fn pending_spawns(&self) -> usize {
        self.timers.len()
    }

    /// New shape or side count: fresh goals, empty board, scores reset
    pub fn reconfigure(
        &mut self,
        shape: ShapeKind,
        sides: u32,
    ) -> Result<Arc<ArenaSnapshot>, SessionError> {
        let config = self.settings.arena_config(shape, sides);
        config.validate()?;
        let goals = assign_goals(sides, &self.settings.palette, &mut self.rng);
        let snapshot = self.board.reconfigure(config, goals)?;

        // Anything tied to the old board goes
        self.balls.clear();
        self.timers.clear();
        self.scores.reset(&snapshot.colors());
        self.game_over = false;
        self.events.push(SessionEvent::BoardChanged {
            generation: snapshot.generation,
        });
        self.schedule_initial_spawns();
        Ok(snapshot)
    }

    /// Arena moved (pan/resize); balls and timers follow it
    pub fn place(&mut self, origin: Vec2) -> Result<Arc<ArenaSnapshot>, SessionError> {
        let old = self.board.current().transform;
        let transform = WorldTransform::new(origin, old.scale);
        let snapshot = self.board.place(transform)?;

        for ball in &mut self.balls {
            ball.pos = transform.to_world(old.to_local(ball.pos));
            ball.generation = snapshot.generation;
        }
        for timer in &mut self.timers {
            timer.generation = snapshot.generation;
        }
        self.events.push(SessionEvent::BoardChanged {
            generation: snapshot.generation,
        });
        Ok(snapshot)
    }

    pub fn begin_drag(&mut self, id: u32) -> Result<(), SessionError> {
        let ball = self.ball_mut(id)?;
        if ball.begin_drag() {
            Ok(())
        } else {
            Err(SessionError::NotDraggable(id))
        }
    }

    pub fn drag_to(&mut self, id: u32, pos: Vec2) -> Result<(), SessionError> {
        self.ball_mut(id)?.drag_to(pos);
        Ok(())
    }

    /// Release a dragged ball at `point`, as seen on board `generation`
    pub fn release(
        &mut self,
        id: u32,
        point: Vec2,
        generation: u64,
    ) -> Result<DropOutcome, SessionError> {
        let current = self.board.generation();
        if generation != current {
            log::warn!("Dropping release of ball {id}: generation {generation} != {current}");
            return Err(SessionError::StaleGeneration {
                event: generation,
                current,
            });
        }

        let snapshot = self.board.snapshot();
        let now = self.now_ms;
        let timings = self.settings.balls.clone();
        let ball = self.ball_mut(id)?;
        if ball.state != BallState::Dragging {
            return Err(SessionError::NotDraggable(id));
        }
        ball.pos = point;

        let outcome = snapshot.classify(point, ball.color);
        ball.release(outcome, Some(snapshot.center()), now, &timings);
        log::debug!("Ball {id} dropped at {point}: {}", outcome.as_str());

        let returned = outcome.is_miss().then_some(ball.pos);

        self.scores.record_drop(outcome);
        self.events.push(SessionEvent::Dropped { id, outcome });
        if let Some(pos) = returned {
            self.events.push(SessionEvent::BallReturned { id, pos });
        }
        Ok(outcome)
    }

    /// Advance the clock: fire spawns, finish animations, expire balls
    pub fn advance(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;
        let generation = self.board.generation();

        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.due_ms <= now);
        self.timers = pending;
        for timer in due {
            if timer.generation != generation {
                log::warn!("Discarding spawn scheduled for generation {}", timer.generation);
                continue;
            }
            self.spawn_ball();
        }

        let timings = self.settings.balls.clone();
        let mut finished = Vec::new();
        for ball in &mut self.balls {
            match ball.state {
                BallState::Falling if ball.deadline_passed(now) => {
                    ball.land(now, &timings);
                    self.events.push(SessionEvent::BallLanded { id: ball.id });
                }
                BallState::Settled if ball.expired(now) => {
                    ball.fade(now, &timings);
                    self.events.push(SessionEvent::BallFading { id: ball.id });
                }
                BallState::Scoring { .. } | BallState::Fading if ball.deadline_passed(now) => {
                    finished.push((ball.id, ball.state, ball.color));
                }
                _ => {}
            }
        }

        for (id, state, color) in finished {
            self.balls.retain(|b| b.id != id);
            if let BallState::Scoring { .. } = state
                && let Some(score) = self.scores.add_point(color)
            {
                self.events.push(SessionEvent::PointScored { color, score });
            }
            self.events.push(SessionEvent::BallRemoved { id });

            if self.scores.is_complete() {
                self.finish_game();
            } else if !self.game_over {
                self.schedule_spawn(now.saturating_add(timings.respawn_delay_ms));
            }
        }

        std::mem::take(&mut self.events)
    }

    fn finish_game(&mut self) {
        if self.game_over {
            return;
        }
        log::info!(
            "All goals complete: {} points, accuracy {:.0}%",
            self.scores.total(),
            self.scores.accuracy() * 100.0
        );
        self.game_over = true;
        self.timers.clear();
        let now = self.now_ms;
        let timings = self.settings.balls.clone();
        for ball in &mut self.balls {
            if !ball.is_leaving() {
                ball.fade(now, &timings);
                self.events.push(SessionEvent::BallFading { id: ball.id });
            }
        }
        self.events.push(SessionEvent::GameOver);
    }

    fn ball_mut(&mut self, id: u32) -> Result<&mut Ball, SessionError> {
        self.balls
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(SessionError::UnknownBall(id))
    }

    fn schedule_spawn(&mut self, due_ms: u64) {
        self.timers.push(SpawnTimer {
            due_ms,
            generation: self.board.generation(),
        });
    }

    fn schedule_initial_spawns(&mut self) {
        let count = self.settings.max_balls(self.board.current().goals.len());
        let (a, b) = (
            self.settings.balls.stagger_min_ms,
            self.settings.balls.stagger_max_ms,
        );
        let (lo, hi) = (a.min(b), a.max(b));
        let mut due = self.now_ms;
        for _ in 0..count {
            due = due.saturating_add(self.rng.random_range(lo..=hi));
            self.schedule_spawn(due);
        }
    }

    fn spawn_ball(&mut self) {
        if self.game_over {
            return;
        }
        let snapshot = self.board.snapshot();
        let active = self.balls.iter().filter(|b| !b.is_leaving()).count();
        if active >= self.settings.max_balls(snapshot.goals.len()) {
            return;
        }

        let colors = self.scores.available_colors();
        let Some(&color) = colors.choose(&mut self.rng) else {
            log::info!("All colors complete, not spawning");
            return;
        };
        let Some(target) = snapshot.sample_spawn(&mut self.rng) else {
            log::warn!("No spawn point in play area, retrying");
            self.schedule_spawn(self.now_ms.saturating_add(SPAWN_RETRY_MS));
            return;
        };

        let id = self.next_id;
        self.next_id += 1;
        let ball = Ball::spawn(
            id,
            color,
            target,
            snapshot.generation,
            self.now_ms,
            &self.settings.balls,
        );
        log::debug!("Spawned ball {id} ({color}) at {target}");
        self.balls.push(ball);
        self.events.push(SessionEvent::BallSpawned { id, color, target });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Settings::default(), 7, Vec2::new(400.0, 300.0)).unwrap()
    }

    /// Run the clock until every initial ball has landed
    fn settle(session: &mut Session) -> u64 {
        let now = 10_000;
        session.advance(now);
        session.advance(now + 1_000);
        now + 1_000
    }

    #[test]
    fn test_initial_spawns_one_ball_per_goal() {
        let mut s = session();
        assert_eq!(s.pending_spawns(), 3);
        let events = s.advance(10_000);
        let spawned = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::BallSpawned { .. }))
            .count();
        assert_eq!(spawned, 3);
        assert_eq!(s.balls().len(), 3);
        assert_eq!(s.pending_spawns(), 0);

        let snapshot = s.snapshot();
        for ball in s.balls() {
            assert!(crate::arena::point_in_polygon(ball.pos, &snapshot.play_area));
            assert!(snapshot.colors().contains(&ball.color));
        }
    }

    #[test]
    fn test_correct_drop_scores_and_respawns() {
        let mut s = session();
        let now = settle(&mut s);
        let ball = s.balls()[0].clone();
        let snapshot = s.snapshot();
        let goal = snapshot.goals.iter().find(|g| g.color == ball.color).unwrap();
        let sensor = *snapshot.sensor(goal.side_index).unwrap();

        s.begin_drag(ball.id).unwrap();
        let outcome = s.release(ball.id, sensor.center, s.generation()).unwrap();
        assert_eq!(outcome, DropOutcome::Correct { side_index: goal.side_index });
        assert_eq!(s.scores().correct_drops, 1);

        let flight = s.settings().balls.score_flight_ms;
        let events = s.advance(now + flight);
        assert!(events.contains(&SessionEvent::PointScored { color: ball.color, score: 1 }));
        assert!(events.contains(&SessionEvent::BallRemoved { id: ball.id }));
        assert_eq!(s.scores().score(ball.color), 1);
        assert_eq!(s.pending_spawns(), 1);
    }

    #[test]
    fn test_wrong_goal_returns_ball_to_center() {
        let mut s = session();
        settle(&mut s);
        let ball = s.balls()[0].clone();
        let snapshot = s.snapshot();
        let other = snapshot.sensors.iter().find(|x| x.color != ball.color).unwrap();

        s.begin_drag(ball.id).unwrap();
        let outcome = s.release(ball.id, other.center, s.generation()).unwrap();
        assert!(matches!(outcome, DropOutcome::WrongGoal { .. }));
        let after = s.ball(ball.id).unwrap();
        assert_eq!(after.state, BallState::Settled);
        assert_eq!(after.pos, snapshot.center());
        assert_eq!(s.scores().incorrect_drops, 1);

        let events = s.advance(s.now_ms);
        assert!(events.contains(&SessionEvent::BallReturned {
            id: ball.id,
            pos: snapshot.center()
        }));
    }

    #[test]
    fn test_release_requires_drag() {
        let mut s = session();
        settle(&mut s);
        let id = s.balls()[0].id;
        let generation = s.generation();
        assert!(matches!(
            s.release(id, Vec2::ZERO, generation),
            Err(SessionError::NotDraggable(n)) if n == id
        ));
        assert!(matches!(
            s.release(999, Vec2::ZERO, generation),
            Err(SessionError::UnknownBall(999))
        ));
    }

    #[test]
    fn test_new_validates_settings() {
        let mut settings = Settings::default();
        settings.board.pixel_scale = 0.0;
        assert!(matches!(
            Session::new(settings, 1, Vec2::ZERO),
            Err(SessionError::Settings(SettingsError::Invalid(_)))
        ));

        let mut settings = Settings::default();
        settings.board.pixel_scale = f32::NAN;
        assert!(Session::new(settings, 1, Vec2::ZERO).is_err());

        assert!(matches!(
            Session::new(Settings::default(), 1, Vec2::new(f32::NAN, 0.0)),
            Err(SessionError::Arena(ArenaError::InvalidDimension { field: "origin.x", .. }))
        ));
    }

    #[test]
    fn test_place_rejects_non_finite_origin() {
        let mut s = session();
        settle(&mut s);
        let generation = s.generation();
        let before = s.balls()[0].pos;
        assert!(s.place(Vec2::new(f32::INFINITY, 0.0)).is_err());
        assert_eq!(s.generation(), generation);
        assert_eq!(s.balls()[0].pos, before);
        assert_eq!(s.balls()[0].generation, generation);
    }

    #[test]
    fn test_degenerate_play_area_retries_spawn() {
        let mut s = session();
        s.board.collapse_play_area();
        let generation = s.generation();

        let events = s.advance(10_000);
        assert!(s.balls().is_empty());
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::BallSpawned { .. })));
        assert_eq!(s.pending_spawns(), 3);
        assert!(s.timers.iter().all(|t| {
            t.due_ms == 10_000 + SPAWN_RETRY_MS && t.generation == generation
        }));

        // Still degenerate: retried again, never placed
        s.advance(10_000 + SPAWN_RETRY_MS);
        assert!(s.balls().is_empty());
        assert!(s.timers.iter().all(|t| t.due_ms == 10_000 + 2 * SPAWN_RETRY_MS));
    }

    #[test]
    fn test_huge_timings_do_not_overflow() {
        let settings = Settings::from_json(
            r#"{ "balls": { "lifespan_ms": 18446744073709551615, "respawn_delay_ms": 18446744073709551615 } }"#,
        )
        .unwrap();
        let mut s = Session::new(settings, 5, Vec2::ZERO).unwrap();
        s.advance(10_000);
        s.advance(11_000);
        assert_eq!(s.balls().len(), 3);
        assert!(s.balls().iter().all(|b| b.state == BallState::Settled));
        assert!(s.balls().iter().all(|b| b.expires_at_ms == Some(u64::MAX)));

        // Far future: balls fade, are removed, and respawns saturate
        let events = s.advance(u64::MAX);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::BallFading { .. })));
        let events = s.advance(u64::MAX);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::BallRemoved { .. })));
        assert!(s.timers.iter().all(|t| t.due_ms == u64::MAX));
    }

    #[test]
    fn test_stale_release_rejected_after_reconfigure() {
        let mut s = session();
        settle(&mut s);
        let id = s.balls()[0].id;
        s.begin_drag(id).unwrap();
        let old = s.generation();

        s.reconfigure(ShapeKind::Polygon, 5).unwrap();
        assert!(s.balls().is_empty());
        assert_eq!(s.pending_spawns(), 5);
        assert!(matches!(
            s.release(id, Vec2::ZERO, old),
            Err(SessionError::StaleGeneration { .. })
        ));
    }

    #[test]
    fn test_reconfigure_rejects_bad_shape_and_keeps_board() {
        let mut s = session();
        let generation = s.generation();
        assert!(s.reconfigure(ShapeKind::Polygon, 2).is_err());
        assert_eq!(s.generation(), generation);
        assert_eq!(s.snapshot().sensors.len(), 3);
    }

    #[test]
    fn test_place_moves_balls_with_board() {
        let mut s = session();
        settle(&mut s);
        let before = s.balls()[0].pos;
        s.place(Vec2::new(450.0, 300.0)).unwrap();
        let after = s.balls()[0].pos;
        assert!((after - before - Vec2::new(50.0, 0.0)).length() < 1e-3);
        assert_eq!(s.balls()[0].generation, s.generation());
    }

    #[test]
    fn test_settled_balls_fade_after_lifespan() {
        let mut s = session();
        let now = settle(&mut s);
        let lifespan = s.settings().balls.lifespan_ms;
        let events = s.advance(now + lifespan);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::BallFading { .. })));

        let fade = s.settings().balls.fade_ms;
        let events = s.advance(now + lifespan + fade);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::BallRemoved { .. })));
        assert!(s.pending_spawns() > 0);
    }

    #[test]
    fn test_game_over_when_all_colors_complete() {
        let mut settings = Settings::default();
        settings.individual_max_score = 1;
        let mut s = Session::new(settings, 11, Vec2::ZERO).unwrap();
        let mut now = settle(&mut s);

        let mut game_over = false;
        for _ in 0..40 {
            let Some(ball) = s
                .balls()
                .iter()
                .find(|b| b.state == BallState::Settled)
                .cloned()
            else {
                now += 2_000;
                s.advance(now);
                continue;
            };
            let snapshot = s.snapshot();
            let goal = snapshot.goals.iter().find(|g| g.color == ball.color).unwrap();
            let center = snapshot.sensor(goal.side_index).unwrap().center;
            s.begin_drag(ball.id).unwrap();
            s.release(ball.id, center, s.generation()).unwrap();
            now += 2_000;
            if s.advance(now).contains(&SessionEvent::GameOver) {
                game_over = true;
                break;
            }
        }
        assert!(game_over);
        assert!(s.is_game_over());
        assert_eq!(s.pending_spawns(), 0);
        assert!(s.balls().iter().all(|b| b.is_leaving()));
    }
}
