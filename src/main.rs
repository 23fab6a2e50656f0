//! Balloon Ascent entry point
//!
//! Native builds run one headless session on a virtual 60 fps clock and
//! print the final snapshot as JSON. Configuration comes from the
//! environment:
//! - `BALLOON_SEED`: run seed (default 1)
//! - `BALLOON_LAND_SCORE`: land once the score reaches this (default: never)
//! - `BALLOON_WIDTH` / `BALLOON_HEIGHT`: canvas size (default 800x600)
//! - `BALLOON_TUNING`: path to a tuning JSON file
//!
//! The browser build exports `WebGame` from the library instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::env;
    use std::fs;
    use std::str::FromStr;

    use balloon_ascent::Tuning;
    use balloon_ascent::platform::{FramePacer, run_frame};
    use balloon_ascent::sim::{GameEvent, GamePhase, GameState, TickInput};

    /// Virtual display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    fn env_or<T: FromStr>(key: &str, default: T) -> T {
        match env::var(key) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("{}={:?} is not valid, using the default", key, raw);
                default
            }),
            Err(_) => default,
        }
    }

    fn load_tuning() -> Tuning {
        let Ok(path) = env::var("BALLOON_TUNING") else {
            return Tuning::default();
        };
        match fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        let seed: u64 = env_or("BALLOON_SEED", 1);
        let land_score: Option<u64> = env::var("BALLOON_LAND_SCORE")
            .ok()
            .and_then(|raw| raw.parse().ok());
        let width: f32 = env_or("BALLOON_WIDTH", 800.0);
        let height: f32 = env_or("BALLOON_HEIGHT", 600.0);

        let mut state = GameState::new(seed, width, height, load_tuning());
        let mut pacer = FramePacer::new();
        let mut input = TickInput {
            start: true,
            ..Default::default()
        };
        log::info!(
            "Headless run: seed {}, {}x{}, land at {:?}",
            seed,
            state.viewport.width,
            state.viewport.height,
            land_score
        );

        let mut frame_ms = 0.0;
        for _ in 0..MAX_FRAMES {
            run_frame(&mut state, &mut pacer, &mut input, frame_ms);
            frame_ms += FRAME_MS;

            if state.phase == GamePhase::Playing
                && land_score.is_some_and(|target| state.session.score >= target)
            {
                input.land = true;
            }

            for event in state.drain_events() {
                match event {
                    GameEvent::ParticleBurst(report) => log::debug!(
                        "{:?} burst: {} particles",
                        report.effect,
                        report.total()
                    ),
                    other => log::debug!("{:?}", other),
                }
            }

            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        if state.phase != GamePhase::GameOver {
            log::warn!("Session did not finish within {} frames", MAX_FRAMES);
        }
        match serde_json::to_string_pretty(&state.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Cannot encode snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balloon Ascent (native, headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `WebGame` in the library, this is just to satisfy the compiler
}
