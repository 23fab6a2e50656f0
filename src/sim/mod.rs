//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Time comes in as an argument, never from a clock
//! - No rendering or platform dependencies

pub mod ascent;
pub mod balloon;
pub mod clouds;
pub mod deferred;
pub mod motion;
pub mod particles;
pub mod responsive;
pub mod risk;
pub mod scenery;
pub mod state;
pub mod tick;

pub use ascent::{AscentSimulator, score_for};
pub use balloon::{Balloon, BalloonLayout, BalloonPose, responsive_scale};
pub use clouds::{Cloud, CloudField, CloudLayer};
pub use deferred::{DeferredTasks, TaskKind};
pub use motion::{Glide, PoseOffset, SwayParams};
pub use particles::{
    Effect, MAX_PARTICLES, Particle, ParticleCategory, ParticleSystem, ParticleView, RingView,
    SpawnReport,
};
pub use responsive::{
    DeviceClass, LayoutTracker, ScaleMode, ScaleProfile, Speeds, Viewport, compute_speeds,
};
pub use risk::{DangerResponse, DangerTier, DangerTracker, RiskScheduler, shake_offset};
pub use scenery::{Ground, Sky, cloud_visibility, interpolate_color};
pub use state::{GameEvent, GamePhase, GameSession, GameSnapshot, GameState, Outcome};
pub use tick::{TickInput, tick};
