//! Ascent simulation
//!
//! Altitude, score and the balloon's visual climb. Speeds are fixed per
//! responsive profile; a profile change only affects future ticks.

use super::responsive::Speeds;
use super::state::GameSession;

/// Advances altitude/score while a session is playing
#[derive(Debug, Clone)]
pub struct AscentSimulator {
    speeds: Speeds,
    score_multiplier: f32,
}

impl AscentSimulator {
    pub fn new(speeds: Speeds, score_multiplier: f32) -> Self {
        Self {
            speeds,
            score_multiplier,
        }
    }

    pub fn speeds(&self) -> Speeds {
        self.speeds
    }

    /// Swap in speeds from a new responsive profile (forward only)
    pub fn set_speeds(&mut self, speeds: Speeds) {
        if speeds != self.speeds {
            log::debug!(
                "Ascent speeds {:.3}/{:.3} -> {:.3}/{:.3}",
                self.speeds.altitude,
                self.speeds.ascent,
                speeds.altitude,
                speeds.ascent
            );
        }
        self.speeds = speeds;
    }

    /// One tick of climb
    pub fn advance(&self, session: &mut GameSession, now_ms: f64) {
        session.altitude += self.speeds.altitude;
        session.visual_position += self.speeds.ascent;
        session.score = score_for(session.altitude, self.score_multiplier);
        session.elapsed_ms = (now_ms - session.start_time_ms).max(session.elapsed_ms);
    }
}

/// Score for an altitude (always floored)
pub fn score_for(altitude: f32, multiplier: f32) -> u64 {
    (altitude * multiplier).floor().max(0.0) as u64
}
