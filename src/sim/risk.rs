//! Risk scheduling and danger tiers
//!
//! Risk rises linearly with session time. The pop instant is drawn once per
//! session; the danger tier (and its shake) is a pure function of risk.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::motion::PoseOffset;
use super::state::GameSession;
use crate::consts::DANGER_THRESHOLD;
use crate::tuning::Tuning;
use crate::{ease_power2_in_out, hash_unit};

/// Discrete risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DangerTier {
    /// [0, 0.6): calm sway and bobbing
    Calm,
    /// [0.6, 0.8): light tremble
    Uneasy,
    /// [0.8, 0.9): hard shake with tilt
    Critical,
    /// [0.9, 1.0]: violent shake with squash
    Extreme,
}

/// Shake shape per tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeShape {
    /// Vertical amplitude relative to horizontal
    pub y_ratio: f32,
    /// Peak tilt (radians, full range)
    pub rotation: f32,
    /// Peak scale wobble (full range)
    pub scale: f32,
}

impl DangerTier {
    pub fn from_risk(risk: f32) -> Self {
        if risk < DANGER_THRESHOLD {
            DangerTier::Calm
        } else if risk < 0.8 {
            DangerTier::Uneasy
        } else if risk < 0.9 {
            DangerTier::Critical
        } else {
            DangerTier::Extreme
        }
    }

    pub fn is_danger(&self) -> bool {
        *self != DangerTier::Calm
    }

    /// Shake amplitude in pixels
    pub fn intensity(&self, risk: f32) -> f32 {
        match self {
            DangerTier::Calm => 0.0,
            DangerTier::Uneasy => (risk - 0.6) * 15.0,
            DangerTier::Critical => 3.0 + (risk - 0.8) * 50.0,
            DangerTier::Extreme => 8.0 + (risk - 0.9) * 70.0,
        }
    }

    /// Seconds per shake step (the tween duration of one jitter)
    pub fn frequency(&self, risk: f32) -> f32 {
        match self {
            DangerTier::Calm => 0.0,
            DangerTier::Uneasy => 0.1 + (risk - 0.6) * 0.15,
            DangerTier::Critical => 0.03 + (risk - 0.8) * 0.02,
            DangerTier::Extreme => 0.02,
        }
    }

    pub fn shape(&self) -> ShakeShape {
        match self {
            DangerTier::Calm => ShakeShape {
                y_ratio: 0.0,
                rotation: 0.0,
                scale: 0.0,
            },
            DangerTier::Uneasy => ShakeShape {
                y_ratio: 0.5,
                rotation: 0.0,
                scale: 0.0,
            },
            DangerTier::Critical => ShakeShape {
                y_ratio: 0.7,
                rotation: 0.1,
                scale: 0.0,
            },
            DangerTier::Extreme => ShakeShape {
                y_ratio: 1.0,
                rotation: 0.15,
                scale: 0.05,
            },
        }
    }
}

/// Jitter target for shake step `step`
fn shake_target(tier: DangerTier, intensity: f32, salt: u32, step: u32) -> PoseOffset {
    let shape = tier.shape();
    let base = step.wrapping_mul(5);
    PoseOffset {
        x: hash_unit(salt, base) * intensity,
        y: hash_unit(salt, base + 1) * intensity * shape.y_ratio,
        rotation: hash_unit(salt, base + 2) * shape.rotation,
        scale_x: hash_unit(salt, base + 3) * shape.scale,
        scale_y: hash_unit(salt, base + 4) * shape.scale,
    }
}

/// Shake offset for a risk level, `elapsed` seconds into its tier
///
/// Each step eases from the previous jitter target to the next, so the
/// result depends only on its arguments.
pub fn shake_offset(risk: f32, elapsed: f32, salt: u32) -> PoseOffset {
    let tier = DangerTier::from_risk(risk);
    if !tier.is_danger() {
        return PoseOffset::ZERO;
    }
    let intensity = tier.intensity(risk);
    let period = tier.frequency(risk);
    let steps = (elapsed.max(0.0) / period).max(0.0);
    let step = steps.floor() as u32;
    let t = ease_power2_in_out(steps.fract());

    let from = if step == 0 {
        PoseOffset::ZERO
    } else {
        shake_target(tier, intensity, salt, step - 1)
    };
    from.lerp(&shake_target(tier, intensity, salt, step), t)
}

/// Result of one danger evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DangerResponse {
    pub tier: DangerTier,
    pub intensity: f32,
    pub frequency: f32,
    /// Shake offset (zero when calm)
    pub shake: PoseOffset,
    /// While settling out of danger: offset to blend from and progress 0-1
    pub settling: Option<(PoseOffset, f32)>,
    /// Previous tier if it changed this evaluation
    pub changed_from: Option<DangerTier>,
}

impl DangerResponse {
    pub fn calm() -> Self {
        Self {
            tier: DangerTier::Calm,
            intensity: 0.0,
            frequency: 0.0,
            shake: PoseOffset::ZERO,
            settling: None,
            changed_from: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Settle {
    from: PoseOffset,
    started_ms: f64,
}

/// Tracks the active danger response
///
/// At most one response is active; entering a different tier restarts the
/// shake clock. Leaving danger starts a one-shot settle back to calm.
#[derive(Debug, Clone)]
pub struct DangerTracker {
    tier: DangerTier,
    was_in_danger: bool,
    tier_started_ms: f64,
    last_shake: PoseOffset,
    settle: Option<Settle>,
    settle_duration: f32,
    salt: u32,
}

impl DangerTracker {
    pub fn new(salt: u32, settle_duration: f32) -> Self {
        Self {
            tier: DangerTier::Calm,
            was_in_danger: false,
            tier_started_ms: 0.0,
            last_shake: PoseOffset::ZERO,
            settle: None,
            settle_duration,
            salt,
        }
    }

    pub fn tier(&self) -> DangerTier {
        self.tier
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Evaluate the response for `risk` at `now_ms`
    pub fn observe(&mut self, risk: f32, now_ms: f64) -> DangerResponse {
        let tier = DangerTier::from_risk(risk);
        let changed_from = (tier != self.tier).then_some(self.tier);
        if changed_from.is_some() {
            self.tier = tier;
            self.tier_started_ms = now_ms;
        }

        let in_danger = tier.is_danger();
        if self.was_in_danger && !in_danger {
            self.settle = Some(Settle {
                from: self.last_shake,
                started_ms: now_ms,
            });
        } else if in_danger {
            self.settle = None;
        }
        self.was_in_danger = in_danger;

        let shake = if in_danger {
            let elapsed = ((now_ms - self.tier_started_ms) / 1000.0) as f32;
            shake_offset(risk, elapsed, self.salt)
        } else {
            PoseOffset::ZERO
        };
        self.last_shake = shake;

        let settling = match self.settle {
            Some(settle) => {
                let progress = ((now_ms - settle.started_ms) / 1000.0) as f32 / self.settle_duration;
                if progress >= 1.0 {
                    self.settle = None;
                    None
                } else {
                    Some((settle.from, progress.max(0.0)))
                }
            }
            None => None,
        };

        DangerResponse {
            tier,
            intensity: tier.intensity(risk),
            frequency: tier.frequency(risk),
            shake,
            settling,
            changed_from,
        }
    }

    /// Drop any response without settling (motion stopped outright)
    pub fn reset(&mut self) {
        self.tier = DangerTier::Calm;
        self.was_in_danger = false;
        self.last_shake = PoseOffset::ZERO;
        self.settle = None;
    }
}

/// Outcome of one risk evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskReport {
    pub risk_level: f32,
    pub danger: DangerResponse,
    /// True exactly once per session, on the first tick at or past pop time
    pub pop: bool,
}

/// Derives risk from the session clock and signals the pop
#[derive(Debug, Clone)]
pub struct RiskScheduler {
    effective_game_time_ms: f64,
    pop_signalled: bool,
    danger: DangerTracker,
}

impl RiskScheduler {
    pub fn new(effective_game_time_ms: f64, salt: u32, settle_duration: f32) -> Self {
        Self {
            effective_game_time_ms,
            pop_signalled: false,
            danger: DangerTracker::new(salt, settle_duration),
        }
    }

    /// Draw the pop instant for a session starting at `start_ms`
    ///
    /// Uniform over `[start + min_safe, start + max_game * multiplier)`.
    pub fn draw_pop_time<R: Rng>(
        rng: &mut R,
        start_ms: f64,
        tuning: &Tuning,
        compact: bool,
    ) -> f64 {
        let lo = tuning.min_safe_time_ms;
        let hi = tuning.effective_game_time_ms(compact);
        start_ms + rng.random_range(lo..hi)
    }

    pub fn effective_game_time_ms(&self) -> f64 {
        self.effective_game_time_ms
    }

    /// Screen class changed mid-session; risk stays monotonic regardless
    pub fn set_effective_game_time(&mut self, ms: f64) {
        self.effective_game_time_ms = ms;
    }

    pub fn pop_signalled(&self) -> bool {
        self.pop_signalled
    }

    pub fn danger(&self) -> &DangerTracker {
        &self.danger
    }

    pub fn danger_mut(&mut self) -> &mut DangerTracker {
        &mut self.danger
    }

    /// Risk level for an elapsed time, clamped to [0, 1]
    pub fn risk_for(&self, elapsed_ms: f64) -> f32 {
        (elapsed_ms / self.effective_game_time_ms).clamp(0.0, 1.0) as f32
    }

    /// Check the pop instant; signals at most once per session
    pub fn check_pop(&mut self, session: &GameSession, now_ms: f64) -> bool {
        if !self.pop_signalled && now_ms >= session.pop_time_ms {
            self.pop_signalled = true;
            return true;
        }
        false
    }

    /// Update the session's risk level and evaluate danger and pop
    pub fn evaluate(&mut self, session: &mut GameSession, now_ms: f64) -> RiskReport {
        let risk = self.risk_for(session.elapsed_ms).max(session.risk_level);
        session.risk_level = risk;

        let danger = self.danger.observe(risk, now_ms);
        if let Some(from) = danger.changed_from {
            log::debug!("Danger tier {:?} -> {:?} at risk {:.2}", from, danger.tier, risk);
        }

        RiskReport {
            risk_level: risk,
            danger,
            pop: self.check_pop(session, now_ms),
        }
    }
}
