//! Responsive speed policy
//!
//! Maps viewport geometry to speed multipliers so a run paces the same on a
//! phone and on a 4K monitor. Pure functions; the state machine re-evaluates
//! them whenever the layout collaborator reports new dimensions.

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_HEIGHT, BASE_WIDTH, COMPACT_MAX_WIDTH, PHONE_MAX_WIDTH};
use crate::error::ViewportError;
use crate::tuning::Tuning;

/// Area above which the performance multiplier kicks in (1920x1080)
pub const PERFORMANCE_AREA: f32 = 2_073_600.0;

/// Viewport dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const BASE: Viewport = Viewport {
        width: BASE_WIDTH,
        height: BASE_HEIGHT,
    };

    /// Validate raw dimensions
    pub fn new(width: f32, height: f32) -> Result<Self, ViewportError> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(ViewportError::Degenerate { width, height })
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Compact screens get slower pacing, longer runs and lighter effects
    pub fn is_compact(&self) -> bool {
        self.width <= COMPACT_MAX_WIDTH
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Width class driving the device multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Phone-width screens (<= 600)
    Narrow,
    /// Small tablets (600, 768]
    Medium,
    /// Everything wider, including the 800x600 reference canvas
    Wide,
}

impl DeviceClass {
    pub fn from_width(width: f32) -> Self {
        if width <= PHONE_MAX_WIDTH {
            DeviceClass::Narrow
        } else if width <= COMPACT_MAX_WIDTH {
            DeviceClass::Medium
        } else {
            DeviceClass::Wide
        }
    }

    pub fn multiplier(&self) -> f32 {
        match self {
            DeviceClass::Narrow => 0.5,
            DeviceClass::Medium => 0.75,
            DeviceClass::Wide => 1.0,
        }
    }
}

/// Multipliers derived from one viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleProfile {
    pub device_multiplier: f32,
    pub size_multiplier: f32,
    pub aspect_multiplier: f32,
    pub performance_multiplier: f32,
}

impl Default for ScaleProfile {
    fn default() -> Self {
        Self::from_viewport(Viewport::BASE)
    }
}

impl ScaleProfile {
    /// Derive the profile for an already-validated viewport
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self {
            device_multiplier: DeviceClass::from_width(viewport.width).multiplier(),
            size_multiplier: size_multiplier(viewport.area() / Viewport::BASE.area()),
            aspect_multiplier: aspect_multiplier(viewport.aspect()),
            performance_multiplier: if viewport.area() > PERFORMANCE_AREA {
                0.95
            } else {
                1.0
            },
        }
    }

    /// Product of all four multipliers
    pub fn combined(&self) -> f32 {
        self.device_multiplier
            * self.size_multiplier
            * self.aspect_multiplier
            * self.performance_multiplier
    }
}

fn size_multiplier(area_ratio: f32) -> f32 {
    if area_ratio > 2.0 {
        1.4
    } else if area_ratio > 1.5 {
        1.2
    } else if area_ratio > 1.0 {
        1.1
    } else if area_ratio < 0.5 {
        0.6
    } else if area_ratio < 0.8 {
        0.8
    } else {
        1.0
    }
}

fn aspect_multiplier(aspect: f32) -> f32 {
    if aspect > 2.0 {
        1.15
    } else if aspect > 1.6 {
        1.05
    } else if aspect < 0.8 {
        0.9
    } else {
        1.0
    }
}

/// Per-tick speeds after scaling and clamping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speeds {
    /// Visual climb per tick (pixels), drives the balloon's screen position
    pub ascent: f32,
    /// Altitude gained per tick (metres)
    pub altitude: f32,
}

impl Speeds {
    pub fn from_profile(profile: &ScaleProfile, tuning: &Tuning) -> Self {
        let scale = profile.combined();
        let (ascent_lo, ascent_hi) = tuning.ascent_speed_range;
        let (alt_lo, alt_hi) = tuning.altitude_speed_range;
        Self {
            ascent: (tuning.base_ascent_speed * scale).clamp(ascent_lo, ascent_hi),
            altitude: (tuning.base_altitude_speed * scale).clamp(alt_lo, alt_hi),
        }
    }
}

/// Evaluate the whole policy for raw dimensions
///
/// Degenerate dimensions are rejected so the caller can keep its previous
/// speeds and retry on the next report.
pub fn compute_speeds(
    width: f32,
    height: f32,
    tuning: &Tuning,
) -> Result<(ScaleProfile, Speeds), ViewportError> {
    let viewport = Viewport::new(width, height)?;
    let profile = ScaleProfile::from_viewport(viewport);
    Ok((profile, Speeds::from_profile(&profile, tuning)))
}

/// Layout mode chosen from the host container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    Computer,
    WideMobile,
    Mobile,
    MobileLandscape,
    WideMobileLandscape,
}

impl ScaleMode {
    /// Pick a mode from container size and whether the device is touch-first
    pub fn classify(container: Viewport, touch_device: bool) -> Self {
        let aspect = container.aspect();
        if aspect >= 1.0 && !touch_device {
            ScaleMode::Computer
        } else if aspect < 0.5 {
            ScaleMode::Mobile
        } else if aspect < 1.0 {
            ScaleMode::WideMobile
        } else if aspect >= 2.0 {
            ScaleMode::MobileLandscape
        } else {
            ScaleMode::WideMobileLandscape
        }
    }

    /// Logical canvas the game renders at in this mode
    pub fn logical_size(&self) -> Viewport {
        let (width, height) = match self {
            ScaleMode::Computer => (1920.0, 1080.0),
            ScaleMode::WideMobile => (600.0, 1000.0),
            ScaleMode::Mobile => (375.0, 812.0),
            ScaleMode::MobileLandscape => (812.0, 375.0),
            ScaleMode::WideMobileLandscape => (1000.0, 600.0),
        };
        Viewport { width, height }
    }

    pub fn is_mobile(&self) -> bool {
        !matches!(self, ScaleMode::Computer)
    }
}

/// Tracks container reports and surfaces scale-mode changes
///
/// Zero-sized reports (container not laid out yet) are deferred: the
/// tracker keeps its last mode and waits for the next valid report.
#[derive(Debug, Clone)]
pub struct LayoutTracker {
    mode: ScaleMode,
    touch_device: bool,
    pending: bool,
}

impl LayoutTracker {
    pub fn new(touch_device: bool) -> Self {
        Self {
            mode: ScaleMode::Computer,
            touch_device,
            pending: true,
        }
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    /// True until the first valid report arrives, or after a rejected one
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Feed a container size; returns the new logical size if the mode changed
    pub fn report(&mut self, width: f32, height: f32) -> Option<Viewport> {
        let container = match Viewport::new(width, height) {
            Ok(v) => v,
            Err(err) => {
                log::warn!("Deferring layout update: {}", err);
                self.pending = true;
                return None;
            }
        };

        let mode = ScaleMode::classify(container, self.touch_device);
        let first = self.pending && mode == self.mode;
        self.pending = false;
        if mode != self.mode || first {
            log::info!("Scale mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            Some(mode.logical_size())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_canvas_is_unscaled() {
        let (profile, speeds) = compute_speeds(800.0, 600.0, &Tuning::default()).unwrap();
        assert_eq!(profile.device_multiplier, 1.0);
        assert_eq!(profile.size_multiplier, 1.0);
        assert_eq!(profile.aspect_multiplier, 1.0);
        assert_eq!(profile.performance_multiplier, 1.0);
        assert!((speeds.altitude - 0.6).abs() < 1e-6);
        assert!((speeds.ascent - 1.5).abs() < 1e-6);
    }

    #[test]
    fn tall_phone_is_narrow() {
        let (profile, speeds) = compute_speeds(375.0, 812.0, &Tuning::default()).unwrap();
        assert_eq!(profile.device_multiplier, 0.5);
        assert_eq!(profile.size_multiplier, 0.8);
        assert_eq!(profile.aspect_multiplier, 0.9);
        // 0.6 * 0.5 * 0.8 * 0.9 = 0.216
        assert!((speeds.altitude - 0.216).abs() < 1e-5);
    }

    #[test]
    fn big_screens_hit_the_clamps() {
        let (profile, speeds) = compute_speeds(3840.0, 1600.0, &Tuning::default()).unwrap();
        assert_eq!(profile.size_multiplier, 1.4);
        assert_eq!(profile.aspect_multiplier, 1.15);
        assert_eq!(profile.performance_multiplier, 0.95);
        // 1.5 * 1.4 * 1.15 * 0.95 = 2.29 -> clamped
        assert_eq!(speeds.ascent, 2.0);
    }

    #[test]
    fn degenerate_viewport_is_rejected() {
        let tuning = Tuning::default();
        assert!(compute_speeds(0.0, 600.0, &tuning).is_err());
        assert!(compute_speeds(800.0, -1.0, &tuning).is_err());
        assert!(compute_speeds(f32::NAN, 600.0, &tuning).is_err());
        assert!(compute_speeds(f32::INFINITY, 600.0, &tuning).is_err());
    }

    #[test]
    fn device_breakpoints() {
        assert_eq!(DeviceClass::from_width(600.0), DeviceClass::Narrow);
        assert_eq!(DeviceClass::from_width(700.0), DeviceClass::Medium);
        assert_eq!(DeviceClass::from_width(768.0), DeviceClass::Medium);
        assert_eq!(DeviceClass::from_width(800.0), DeviceClass::Wide);
    }

    #[test]
    fn scale_mode_classification() {
        let v = |w, h| Viewport::new(w, h).unwrap();
        assert_eq!(ScaleMode::classify(v(1600.0, 900.0), false), ScaleMode::Computer);
        assert_eq!(ScaleMode::classify(v(400.0, 900.0), true), ScaleMode::Mobile);
        assert_eq!(ScaleMode::classify(v(700.0, 900.0), false), ScaleMode::WideMobile);
        assert_eq!(ScaleMode::classify(v(900.0, 400.0), true), ScaleMode::MobileLandscape);
        assert_eq!(ScaleMode::classify(v(900.0, 600.0), true), ScaleMode::WideMobileLandscape);
        assert_eq!(ScaleMode::Mobile.logical_size(), v(375.0, 812.0));
    }

    #[test]
    fn layout_tracker_defers_zero_reports() {
        let mut tracker = LayoutTracker::new(false);
        assert_eq!(tracker.report(0.0, 0.0), None);
        assert!(tracker.is_pending());

        // First valid report always announces the layout
        assert_eq!(tracker.report(1600.0, 900.0), Some(ScaleMode::Computer.logical_size()));
        assert!(!tracker.is_pending());
        assert_eq!(tracker.report(1700.0, 900.0), None);

        assert_eq!(tracker.report(400.0, 900.0), Some(ScaleMode::Mobile.logical_size()));
        assert_eq!(tracker.mode(), ScaleMode::Mobile);
    }

    proptest! {
        #[test]
        fn speeds_always_within_clamps(w in 1.0f32..8000.0, h in 1.0f32..8000.0) {
            let tuning = Tuning::default();
            let (_, speeds) = compute_speeds(w, h, &tuning).unwrap();
            prop_assert!(speeds.altitude >= 0.2 && speeds.altitude <= 1.2);
            prop_assert!(speeds.ascent >= 0.4 && speeds.ascent <= 2.0);
            prop_assert!(speeds.altitude.is_finite() && speeds.ascent.is_finite());
        }
    }
}
