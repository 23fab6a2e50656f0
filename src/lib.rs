//! Balloon Ascent - push-your-luck arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ascent, risk, particles, game state)
//! - `tuning`: Data-driven game balance
//! - `platform`: Browser/native platform abstraction (clock, JS binding)
//! - `error`: Error types for rejected inputs

pub mod error;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::{TuningError, ViewportError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the game was balanced at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per second implied by `SIM_DT`
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed timestep in milliseconds (for the session clock)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Reference canvas the balance was tuned on
    pub const BASE_WIDTH: f32 = 800.0;
    pub const BASE_HEIGHT: f32 = 600.0;

    /// Screens at or below this width count as compact (mobile)
    pub const COMPACT_MAX_WIDTH: f32 = 768.0;
    /// Screens at or below this width count as phones
    pub const PHONE_MAX_WIDTH: f32 = 600.0;

    /// Risk level where the danger shake takes over from the calm sway
    pub const DANGER_THRESHOLD: f32 = 0.6;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ease "sine.inOut": slow at both ends
#[inline]
pub fn ease_sine_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    -((std::f32::consts::PI * t).cos() - 1.0) / 2.0
}

/// Ease "power2.out": fast start, quadratic settle
#[inline]
pub fn ease_power2_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Ease "power2.inOut"
#[inline]
pub fn ease_power2_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Position along a repeating yoyo cycle (0 → 1 → 0) with sine easing
///
/// `half_period` is the time to travel one way, matching a yoyo tween's duration.
#[inline]
pub fn yoyo_sine(elapsed: f32, half_period: f32) -> f32 {
    if half_period <= 0.0 {
        return 0.0;
    }
    let cycle = (elapsed / half_period).max(0.0);
    let leg = cycle.floor() as u64;
    let frac = cycle.fract();
    let t = if leg % 2 == 0 { frac } else { 1.0 - frac };
    ease_sine_in_out(t)
}

/// Cheap integer hash mapped to [-0.5, 0.5)
///
/// Stateless jitter for effects that must be a pure function of time.
#[inline]
pub fn hash_unit(seed: u32, index: u32) -> f32 {
    let mut h = seed ^ index.wrapping_mul(0x9E37_79B9);
    h = h.wrapping_mul(2654435761);
    h ^= h >> 15;
    h = h.wrapping_mul(31337);
    h ^= h >> 13;
    (h % 10_000) as f32 / 10_000.0 - 0.5
}
