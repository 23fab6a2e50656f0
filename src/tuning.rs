//! Data-driven game balance
//!
//! Every constant the simulation is balanced on. Loaded from JSON in the
//! browser build; missing fields fall back to the shipped values.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Game balance constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Ascent ===
    /// Visual climb per tick before responsive scaling (pixels)
    pub base_ascent_speed: f32,
    /// Altitude gained per tick before responsive scaling (metres)
    pub base_altitude_speed: f32,
    /// Clamp for the scaled visual climb speed
    pub ascent_speed_range: (f32, f32),
    /// Clamp for the scaled altitude speed
    pub altitude_speed_range: (f32, f32),
    /// Score points per metre of altitude
    pub score_multiplier: f32,

    // === Risk ===
    /// Guaranteed pop-free time after launch (ms)
    pub min_safe_time_ms: f64,
    /// Latest pop time and full-risk horizon (ms)
    pub max_game_time_ms: f64,
    /// Extra time granted on compact screens
    pub compact_time_multiplier: f64,

    // === Result flow ===
    /// Delay between pop and the game over screen (ms)
    pub pop_result_delay_ms: f64,
    /// Delay between landing and the success screen (ms)
    pub land_result_delay_ms: f64,
    /// Same, on compact screens
    pub compact_land_result_delay_ms: f64,
    /// Delay between the land command and the balloon starting to sink (ms)
    pub descent_delay_ms: f64,
    /// Descent animation length (s)
    pub descent_duration: f32,
    /// Same, on compact screens
    pub compact_descent_duration: f32,
    /// Distance the balloon sinks when landing (pixels)
    pub descent_distance: f32,
    pub compact_portrait_descent_distance: f32,
    pub compact_landscape_descent_distance: f32,

    // === Motion ===
    /// Time to settle back to the calm pose after leaving danger (s)
    pub calm_transition_duration: f32,
    /// Visual position at which the sway/wind/bob starts
    pub sway_start_position: f32,
    /// Visual position at which the balloon reaches screen centre
    pub centre_position: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_ascent_speed: 1.5,
            base_altitude_speed: 0.6,
            ascent_speed_range: (0.4, 2.0),
            altitude_speed_range: (0.2, 1.2),
            score_multiplier: 10.0,

            min_safe_time_ms: 20_000.0,
            max_game_time_ms: 50_000.0,
            compact_time_multiplier: 1.4,

            pop_result_delay_ms: 1000.0,
            land_result_delay_ms: 2500.0,
            compact_land_result_delay_ms: 2000.0,
            descent_delay_ms: 100.0,
            descent_duration: 2.0,
            compact_descent_duration: 1.5,
            descent_distance: 100.0,
            compact_portrait_descent_distance: 150.0,
            compact_landscape_descent_distance: 120.0,

            calm_transition_duration: 0.3,
            sway_start_position: 150.0,
            centre_position: 400.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse tuning, falling back to defaults (with a warning) on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring tuning overrides: {}", err);
                Self::default()
            }
        }
    }

    /// Keep this tuning if it validates, otherwise warn and use the defaults
    pub fn or_default_if_invalid(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                log::warn!("Rejecting tuning: {}; using defaults", err);
                Self::default()
            }
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.min_safe_time_ms > 0.0) {
            return Err(invalid("min_safe_time_ms", "must be positive"));
        }
        if !(self.max_game_time_ms > self.min_safe_time_ms) {
            return Err(invalid(
                "max_game_time_ms",
                format!(
                    "must exceed min_safe_time_ms ({} <= {})",
                    self.max_game_time_ms, self.min_safe_time_ms
                ),
            ));
        }
        if !(self.compact_time_multiplier >= 1.0) {
            return Err(invalid("compact_time_multiplier", "must be at least 1.0"));
        }
        for (field, (lo, hi)) in [
            ("ascent_speed_range", self.ascent_speed_range),
            ("altitude_speed_range", self.altitude_speed_range),
        ] {
            if !(lo > 0.0 && hi >= lo) {
                return Err(invalid(field, format!("bad range ({lo}, {hi})")));
            }
        }
        if !(self.base_ascent_speed > 0.0 && self.base_altitude_speed > 0.0) {
            return Err(invalid("base_altitude_speed", "speeds must be positive"));
        }
        for (field, delay) in [
            ("pop_result_delay_ms", self.pop_result_delay_ms),
            ("land_result_delay_ms", self.land_result_delay_ms),
            ("compact_land_result_delay_ms", self.compact_land_result_delay_ms),
            ("descent_delay_ms", self.descent_delay_ms),
        ] {
            if !(delay >= 0.0) {
                return Err(invalid(field, "must be non-negative"));
            }
        }
        if !(self.calm_transition_duration > 0.0) {
            return Err(invalid("calm_transition_duration", "must be positive"));
        }
        if !(self.centre_position > 0.0) {
            return Err(invalid("centre_position", "must be positive"));
        }
        Ok(())
    }

    /// Full-risk horizon for a screen class (ms)
    pub fn effective_game_time_ms(&self, compact: bool) -> f64 {
        if compact {
            self.max_game_time_ms * self.compact_time_multiplier
        } else {
            self.max_game_time_ms
        }
    }

    pub fn land_result_delay(&self, compact: bool) -> f64 {
        if compact {
            self.compact_land_result_delay_ms
        } else {
            self.land_result_delay_ms
        }
    }

    pub fn descent_duration(&self, compact: bool) -> f32 {
        if compact {
            self.compact_descent_duration
        } else {
            self.descent_duration
        }
    }

    pub fn descent_distance(&self, compact: bool, portrait: bool) -> f32 {
        match (compact, portrait) {
            (false, _) => self.descent_distance,
            (true, true) => self.compact_portrait_descent_distance,
            (true, false) => self.compact_landscape_descent_distance,
        }
    }
}
