//! Error types
//!
//! Nothing here ever reaches the player. Callers log and fall back to the
//! last good value.

use thiserror::Error;

/// Rejected viewport report from the layout collaborator
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewportError {
    /// Zero, negative or non-finite dimensions (container not laid out yet)
    #[error("degenerate viewport {width}x{height}")]
    Degenerate { width: f32, height: f32 },
}

/// Failure loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
