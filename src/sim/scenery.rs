//! Altitude-driven scenery
//!
//! Sky colour, star visibility, cloud fade and ground position. Everything
//! here is a pure function of altitude and screen class except the ground
//! return after landing.

use serde::{Deserialize, Serialize};

use super::motion::Glide;
use super::responsive::Viewport;

pub const SKY_BLUE: u32 = 0x87CEEB;
pub const ROYAL_BLUE: u32 = 0x4169E1;
pub const MIDNIGHT_BLUE: u32 = 0x191970;
pub const DEEP_SPACE: u32 = 0x0B0B2F;
pub const BLACK: u32 = 0x000000;

/// Ground scrolls down this many pixels per unit of altitude
pub const GROUND_PARALLAX: f32 = 0.8;

/// Compact screens stretch every altitude threshold
fn threshold_multiplier(compact: bool) -> f32 {
    if compact { 1.5 } else { 1.0 }
}

/// Channel-wise blend of two 0xRRGGBB colours
pub fn interpolate_color(from: u32, to: u32, factor: f32) -> u32 {
    let channel = |shift: u32| {
        let a = ((from >> shift) & 0xFF) as f32;
        let b = ((to >> shift) & 0xFF) as f32;
        ((a + (b - a) * factor).round().clamp(0.0, 255.0) as u32) << shift
    };
    channel(16) | channel(8) | channel(0)
}

/// Sky colour and star alpha at an altitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sky {
    pub color: u32,
    /// 0 while the sky is still blue
    pub star_alpha: f32,
}

impl Sky {
    pub fn at(altitude: f32, compact: bool) -> Self {
        let m = threshold_multiplier(compact);
        let sky_blue = 600.0 * m;
        let royal_blue = 1500.0 * m;
        let space = 3000.0 * m;

        if altitude < sky_blue {
            Sky {
                color: interpolate_color(SKY_BLUE, ROYAL_BLUE, altitude.max(0.0) / sky_blue),
                star_alpha: 0.0,
            }
        } else if altitude < royal_blue {
            let p = (altitude - sky_blue) / (royal_blue - sky_blue);
            Sky {
                color: interpolate_color(ROYAL_BLUE, MIDNIGHT_BLUE, p),
                star_alpha: 0.0,
            }
        } else if altitude < space {
            let p = (altitude - royal_blue) / (space - royal_blue);
            Sky {
                color: interpolate_color(MIDNIGHT_BLUE, DEEP_SPACE, p),
                star_alpha: p * 0.3,
            }
        } else {
            let p = ((altitude - space) / (1200.0 * m)).min(1.0);
            Sky {
                color: interpolate_color(DEEP_SPACE, BLACK, p),
                star_alpha: 0.3 + p * 0.7,
            }
        }
    }

    pub fn stars_visible(&self) -> bool {
        self.star_alpha > 0.0
    }
}

/// Cloud opacity factor: 1 until the fade band, 0 above it
pub fn cloud_visibility(altitude: f32, compact: bool) -> f32 {
    let m = threshold_multiplier(compact);
    let fade_start = 2000.0 * m;
    let fade_end = 3000.0 * m;
    if altitude <= fade_start {
        1.0
    } else if altitude > fade_end {
        0.0
    } else {
        1.0 - (altitude - fade_start) / (fade_end - fade_start)
    }
}

/// Ground strip position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    start_y: f32,
    y: f32,
    returning: Option<Glide>,
}

impl Ground {
    pub fn new(viewport: Viewport) -> Self {
        let start_y = Self::start_y_for(viewport);
        Self {
            start_y,
            y: start_y,
            returning: None,
        }
    }

    /// Top edge of the ground at rest
    pub fn start_y_for(viewport: Viewport) -> f32 {
        viewport.height - (viewport.height * 0.25).max(150.0)
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn start_y(&self) -> f32 {
        self.start_y
    }

    pub fn is_returning(&self) -> bool {
        self.returning.is_some()
    }

    /// Scroll away as the balloon climbs
    pub fn follow_altitude(&mut self, altitude: f32) {
        if self.returning.is_none() {
            self.y = self.start_y + altitude * GROUND_PARALLAX;
        }
    }

    /// Slide back to rest (landing)
    pub fn begin_return(&mut self, duration: f32, now_ms: f64) {
        self.returning = Some(Glide::new(self.y, self.start_y, now_ms, duration));
    }

    pub fn update(&mut self, now_ms: f64) {
        if let Some(glide) = &self.returning {
            self.y = glide.value_at(now_ms);
        }
    }

    /// New canvas; resting ground snaps to the new rest line
    pub fn relayout(&mut self, viewport: Viewport, altitude: f32) {
        self.start_y = Self::start_y_for(viewport);
        match &mut self.returning {
            Some(glide) => glide.to = self.start_y,
            None => self.follow_altitude(altitude),
        }
    }

    pub fn reset(&mut self) {
        self.returning = None;
        self.y = self.start_y;
    }
}
