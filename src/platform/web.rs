//! Browser binding
//!
//! The page owns the canvas, input widgets and the animation frame loop; it
//! forwards commands here and draws from the JSON frame this returns.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::{FramePacer, run_frame};
use crate::sim::{GameEvent, GameSnapshot, GameState, LayoutTracker, TickInput};
use crate::tuning::Tuning;

/// What the page receives each animation frame
#[derive(Serialize)]
struct Frame {
    snapshot: GameSnapshot,
    events: Vec<GameEvent>,
}

/// Game instance driven from JS
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    pacer: FramePacer,
    input: TickInput,
    layout: LayoutTracker,
}

#[wasm_bindgen]
impl WebGame {
    /// `width`/`height` are the container size; `tuning` is optional JSON
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, touch_device: bool, tuning: Option<String>) -> WebGame {
        console_error_panic_hook::set_once();
        // A second instance on the same page finds the logger already set
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("Logger already initialised");
        }

        let tuning = tuning
            .map(|json| Tuning::from_json_or_default(&json))
            .unwrap_or_default();
        let mut layout = LayoutTracker::new(touch_device);
        let logical = layout
            .report(width, height)
            .unwrap_or_else(|| layout.mode().logical_size());

        let seed = js_sys::Date::now() as u64;
        log::info!(
            "Balloon Ascent starting: seed {}, {:?} at {}x{}",
            seed,
            layout.mode(),
            logical.width,
            logical.height
        );

        WebGame {
            state: GameState::new(seed, logical.width, logical.height, tuning),
            pacer: FramePacer::new(),
            input: TickInput::default(),
            layout,
        }
    }

    /// Container resized; returns true if the logical canvas changed
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        match self.layout.report(width, height) {
            Some(logical) => self.state.resize(logical.width, logical.height).is_ok(),
            None => false,
        }
    }

    /// Current scale mode name, for the page's CSS
    #[wasm_bindgen(js_name = scaleMode)]
    pub fn scale_mode(&self) -> String {
        format!("{:?}", self.layout.mode())
    }

    pub fn width(&self) -> f32 {
        self.state.viewport.width
    }

    pub fn height(&self) -> f32 {
        self.state.viewport.height
    }

    pub fn start(&mut self) {
        self.input.start = true;
    }

    pub fn land(&mut self) {
        self.input.land = true;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    /// Tab hidden or shown; the next frame starts a fresh pacing interval
    #[wasm_bindgen(js_name = resetClock)]
    pub fn reset_clock(&mut self) {
        self.pacer.reset_frame();
    }

    /// Advance to `now` (ms, from requestAnimationFrame) and return the frame
    pub fn frame(&mut self, now: f64) -> Result<String, JsValue> {
        run_frame(&mut self.state, &mut self.pacer, &mut self.input, now);
        let frame = Frame {
            snapshot: self.state.snapshot(),
            events: self.state.drain_events(),
        };
        serde_json::to_string(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
