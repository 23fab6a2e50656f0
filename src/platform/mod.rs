//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock (milliseconds)
//! - Frame pacing onto the fixed simulation step
//! - The JS binding (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::{MAX_SUBSTEPS, SIM_DT, SIM_DT_MS};
use crate::sim::{GameState, TickInput, tick};

/// Longest frame gap fed to the accumulator (ms); longer stalls are dropped
const MAX_FRAME_MS: f64 = 250.0;

/// Milliseconds since process start
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Milliseconds from `performance.now()`, or the date clock without one
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Turns irregular frame timestamps into fixed simulation steps
///
/// The simulation clock only moves in `SIM_DT_MS` increments, so a session
/// replays identically for the same inputs regardless of frame rate.
#[derive(Debug, Clone, Default)]
pub struct FramePacer {
    accumulator_ms: f64,
    last_frame_ms: Option<f64>,
    sim_ms: f64,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time (ms)
    pub fn sim_ms(&self) -> f64 {
        self.sim_ms
    }

    /// Register a frame; returns how many steps are owed
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        self.accumulator_ms += dt;

        let mut steps = 0;
        while self.accumulator_ms >= SIM_DT_MS && steps < MAX_SUBSTEPS {
            self.accumulator_ms -= SIM_DT_MS;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS && self.accumulator_ms >= SIM_DT_MS {
            log::debug!("Frame pacer behind by {:.1} ms, dropping", self.accumulator_ms);
            self.accumulator_ms = 0.0;
        }
        steps
    }

    /// Advance the simulation clock by one step and return it
    pub fn next_step(&mut self) -> f64 {
        self.sim_ms += SIM_DT_MS;
        self.sim_ms
    }

    /// Forget the previous frame (e.g. after the tab was hidden)
    pub fn reset_frame(&mut self) {
        self.last_frame_ms = None;
        self.accumulator_ms = 0.0;
    }
}

/// Run every step owed for a frame
///
/// One-shot commands are consumed by the first step; with no step owed they
/// wait for the next frame.
pub fn run_frame(
    state: &mut GameState,
    pacer: &mut FramePacer,
    input: &mut TickInput,
    now_ms: f64,
) -> u32 {
    let steps = pacer.frame(now_ms);
    for _ in 0..steps {
        let t = pacer.next_step();
        tick(state, input, t, SIM_DT);
        *input = TickInput::default();
    }
    steps
}
