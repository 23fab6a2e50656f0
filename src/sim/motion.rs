//! Calm balloon motion
//!
//! Sway, wind drift and bobbing expressed as pure functions of the time
//! since the motion started. Parameters are drawn once per session.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ease_power2_out, lerp, yoyo_sine};

/// Offset from the balloon's base pose
///
/// Scale components are deltas from 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseOffset {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl PoseOffset {
    pub const ZERO: PoseOffset = PoseOffset {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale_x: 0.0,
        scale_y: 0.0,
    };

    /// Component-wise interpolation
    pub fn lerp(&self, other: &PoseOffset, t: f32) -> PoseOffset {
        PoseOffset {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            rotation: lerp(self.rotation, other.rotation, t),
            scale_x: lerp(self.scale_x, other.scale_x, t),
            scale_y: lerp(self.scale_y, other.scale_y, t),
        }
    }
}

/// One-shot power2.out slide between two values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glide {
    pub from: f32,
    pub to: f32,
    pub started_ms: f64,
    /// Seconds
    pub duration: f32,
}

impl Glide {
    pub fn new(from: f32, to: f32, started_ms: f64, duration: f32) -> Self {
        Self {
            from,
            to,
            started_ms,
            duration,
        }
    }

    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (((now_ms - self.started_ms) / 1000.0) as f32 / self.duration).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now_ms: f64) -> f32 {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return self.to;
        }
        lerp(self.from, self.to, ease_power2_out(progress))
    }

    pub fn is_done(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Per-session sway parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwayParams {
    /// Peak tilt (radians)
    pub swing_angle: f32,
    /// Peak sideways swing (pixels)
    pub swing_distance: f32,
    /// One-way swing time (s)
    pub swing_time: f32,
    /// Peak wind drift (pixels)
    pub wind_strength: f32,
    /// One-way wind cycle (s)
    pub wind_time: f32,
    /// Peak bob (pixels)
    pub bob_height: f32,
    /// One-way bob cycle (s)
    pub bob_time: f32,
}

impl SwayParams {
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self {
            swing_angle: rng.random_range(0.05..0.13),
            swing_distance: rng.random_range(8.0..20.0),
            swing_time: rng.random_range(2.5..4.5),
            wind_strength: rng.random_range(5.0..15.0),
            wind_time: rng.random_range(8.0..14.0),
            bob_height: rng.random_range(2.0..5.0),
            bob_time: rng.random_range(3.0..5.0),
        }
    }

    /// Calm offset `elapsed` seconds after the motion started
    ///
    /// Wind only blows while the balloon is out of danger.
    pub fn offset(&self, elapsed: f32, wind: bool) -> PoseOffset {
        let swing = yoyo_sine(elapsed, self.swing_time);
        let drift = if wind {
            self.wind_strength * yoyo_sine(elapsed, self.wind_time)
        } else {
            0.0
        };
        PoseOffset {
            x: self.swing_distance * swing + drift,
            y: self.bob_height * yoyo_sine(elapsed, self.bob_time),
            rotation: self.swing_angle * swing,
            scale_x: 0.0,
            scale_y: 0.0,
        }
    }
}
