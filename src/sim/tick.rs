//! Fixed timestep simulation tick
//!
//! Order within one tick:
//! 1. delayed steps due for the current session
//! 2. ascent, then risk (and the pop check) while playing
//! 3. player commands
//! 4. particles, whatever the phase

use super::scenery::cloud_visibility;
use super::state::{GameEvent, GamePhase, GameState};

/// Commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start from the menu
    pub start: bool,
    /// Land the balloon and bank the score
    pub land: bool,
    /// Play again from a result
    pub restart: bool,
}

/// Advance the game by one fixed timestep ending at `now_ms`
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64, dt: f32) {
    for kind in state.tasks.take_due(state.session.id, now_ms) {
        state.fire_task(kind, now_ms);
    }

    if state.phase == GamePhase::Playing {
        advance_playing(state, now_ms);
    }

    // Landing tweens run on after the climb stops
    state.balloon.update_descent(now_ms);
    state.ground.update(now_ms);

    // Commands go after the pop check so a same-tick land cannot race a pop
    if input.land {
        state.land(now_ms);
    }
    if input.start {
        state.start(now_ms);
    }
    if input.restart {
        state.restart(now_ms);
    }

    state.particles.advance(dt);
    state.time_ticks += 1;
}

fn advance_playing(state: &mut GameState, now_ms: f64) {
    state.ascent.advance(&mut state.session, now_ms);

    let visual_position = state.session.visual_position;
    state
        .balloon
        .follow_ascent(visual_position, state.tuning.centre_position);
    if visual_position >= state.tuning.sway_start_position
        && state.balloon.start_sway(state.sway, now_ms)
    {
        log::debug!("Session {}: calm sway started", state.session.id);
        state.emit(GameEvent::SwayStarted);
    }

    let report = state.risk.evaluate(&mut state.session, now_ms);
    if let Some(from) = report.danger.changed_from {
        state.emit(GameEvent::DangerTierChanged {
            from,
            to: report.danger.tier,
        });
    }
    state.balloon.apply_motion(&report.danger, now_ms);

    let altitude = state.session.altitude;
    let compact = state.is_compact();
    state.ground.follow_altitude(altitude);
    state.clouds.advance(
        state.ascent.speeds().ascent,
        cloud_visibility(altitude, compact),
    );

    if report.pop {
        state.pop(now_ms);
    }
}
