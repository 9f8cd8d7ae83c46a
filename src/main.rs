//! Goal Drop entry point
//!
//! The browser build is driven from JavaScript through `platform::web`. The
//! native binary runs a headless game: it builds each board shape, sorts every
//! ball into its goal by the session clock and prints the results.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use goal_drop::Settings;
    use goal_drop::platform;

    platform::init_logging();
    log::info!("Goal Drop (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load_from_path(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let seed = platform::random_seed();
    if let Err(e) = headless::run(settings, seed) {
        log::error!("Headless run failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is platform::web::wasm_start
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use goal_drop::arena::{DropOutcome, ShapeKind};
    use goal_drop::ball::BallState;
    use goal_drop::outline::Outline;
    use goal_drop::session::{Session, SessionError, SessionEvent};
    use goal_drop::settings::Settings;

    /// Simulated frame length
    const FRAME_MS: u64 = 250;
    /// Give up on a board after this much game time
    const BOARD_TIMEOUT_MS: u64 = 30 * 60 * 1000;

    pub fn run(settings: Settings, seed: u64) -> Result<(), SessionError> {
        let origin = Vec2::splat(settings.board.half_extent * settings.board.pixel_scale);
        let mut session = Session::new(settings, seed, origin)?;

        let boards = [
            (ShapeKind::Polygon, 3),
            (ShapeKind::Polygon, 6),
            (ShapeKind::Rectangle, 4),
        ];
        for (shape, sides) in boards {
            let snapshot = session.reconfigure(shape, sides)?;
            let outline = Outline::from_snapshot(&snapshot, &session.settings().goal);
            println!(
                "{} x{}: {} goals, {} walls, {} border lines, generation {}",
                shape.as_str(),
                sides,
                snapshot.sensors.len(),
                snapshot.walls.len(),
                outline.lines.len(),
                snapshot.generation
            );
            play_board(&mut session)?;
        }
        Ok(())
    }

    /// Sort balls until the board is complete or time runs out
    fn play_board(session: &mut Session) -> Result<(), SessionError> {
        let start = session.now_ms();
        let mut now = start;
        let (mut correct, mut missed) = (0u32, 0u32);

        while !session.is_game_over() && now - start < BOARD_TIMEOUT_MS {
            now += FRAME_MS;
            for event in session.advance(now) {
                if let SessionEvent::PointScored { color, score } = event {
                    log::debug!("{color} at {score}");
                }
            }

            let ready: Vec<_> = session
                .balls()
                .iter()
                .filter(|b| b.state == BallState::Settled)
                .map(|b| (b.id, b.color))
                .collect();
            for (id, color) in ready {
                let snapshot = session.snapshot();
                let Some(target) = snapshot
                    .goals
                    .iter()
                    .find(|g| g.color == color)
                    .and_then(|g| snapshot.sensor(g.side_index))
                    .map(|s| s.center)
                else {
                    continue;
                };
                session.begin_drag(id)?;
                session.drag_to(id, target)?;
                match session.release(id, target, snapshot.generation)? {
                    DropOutcome::Correct { .. } => correct += 1,
                    _ => missed += 1,
                }
            }
        }

        let scores = session.scores();
        println!(
            "  {} / {} points ({:.0}%), {} correct, {} missed, {:.1}s game time{}",
            scores.total(),
            scores.total_max(),
            scores.progress() * 100.0,
            correct,
            missed,
            (now - start) as f32 / 1000.0,
            if session.is_game_over() { "" } else { " (timed out)" }
        );
        Ok(())
    }
}
