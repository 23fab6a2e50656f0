//! Balloon pose
//!
//! The base position follows the ascent; calm motion or danger shake is
//! layered on top. Landing and popping stop all motion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{Glide, PoseOffset, SwayParams};
use super::responsive::Viewport;
use super::risk::DangerResponse;
use crate::consts::{BASE_HEIGHT, BASE_WIDTH};
use crate::{ease_power2_out, lerp};

/// Unscaled balloon height (pixels)
const BALLOON_HEIGHT: f32 = 120.0;
/// Gap between the balloon's start position and the bottom edge
const START_MARGIN: f32 = 50.0;

/// Responsive balloon scale for a canvas
pub fn responsive_scale(viewport: Viewport) -> f32 {
    let compact = viewport.width <= 600.0 || viewport.height <= 600.0;
    let wide = viewport.width > 1400.0;
    let landscape = viewport.width > viewport.height;

    let mut scale = (viewport.width / BASE_WIDTH).min(viewport.height / BASE_HEIGHT);
    scale *= match (compact, wide, landscape) {
        (true, _, true) => 2.2,
        (true, _, false) => 2.5,
        (false, true, _) => 3.2,
        (false, false, true) => 1.3,
        (false, false, false) => 1.4,
    };
    scale.clamp(0.8, 4.0)
}

/// Where the balloon lives on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalloonLayout {
    pub centre_x: f32,
    /// Base y at launch (near the ground)
    pub start_y: f32,
    /// Base y once the climb reaches screen centre
    pub target_y: f32,
    pub scale: f32,
}

impl BalloonLayout {
    pub fn from_viewport(viewport: Viewport) -> Self {
        let scale = responsive_scale(viewport);
        Self {
            centre_x: viewport.width / 2.0,
            start_y: viewport.height - BALLOON_HEIGHT * scale - START_MARGIN,
            target_y: viewport.height / 2.0,
            scale,
        }
    }
}

/// Rendered pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalloonPose {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

#[derive(Debug, Clone, Copy)]
struct Sway {
    params: SwayParams,
    started_ms: f64,
}

/// Balloon motion state for one session
#[derive(Debug, Clone)]
pub struct Balloon {
    layout: BalloonLayout,
    base: Vec2,
    offset: PoseOffset,
    sway: Option<Sway>,
    descent: Option<Glide>,
    /// Motion stopped (landed or popped)
    still: bool,
}

impl Balloon {
    pub fn new(layout: BalloonLayout) -> Self {
        Self {
            layout,
            base: Vec2::new(layout.centre_x, layout.start_y),
            offset: PoseOffset::ZERO,
            sway: None,
            descent: None,
            still: false,
        }
    }

    pub fn layout(&self) -> BalloonLayout {
        self.layout
    }

    pub fn is_swaying(&self) -> bool {
        self.sway.is_some()
    }

    pub fn descent(&self) -> Option<&Glide> {
        self.descent.as_ref()
    }

    /// New canvas; a stopped balloon stays as it is
    pub fn set_layout(&mut self, layout: BalloonLayout, visual_position: f32, centre_position: f32) {
        if self.still {
            return;
        }
        self.layout = layout;
        self.follow_ascent(visual_position, centre_position);
    }

    pub fn is_still(&self) -> bool {
        self.still
    }

    /// Base position for the current climb
    pub fn follow_ascent(&mut self, visual_position: f32, centre_position: f32) {
        let progress = (visual_position / centre_position).clamp(0.0, 1.0);
        self.base = Vec2::new(
            self.layout.centre_x,
            lerp(self.layout.start_y, self.layout.target_y, progress),
        );
    }

    /// Start the calm motion once; returns true if it started now
    pub fn start_sway(&mut self, params: SwayParams, now_ms: f64) -> bool {
        if self.sway.is_some() || self.still {
            return false;
        }
        self.sway = Some(Sway {
            params,
            started_ms: now_ms,
        });
        true
    }

    /// Layer calm motion or danger shake onto the base position
    pub fn apply_motion(&mut self, danger: &DangerResponse, now_ms: f64) {
        if self.still {
            return;
        }
        let in_danger = danger.tier.is_danger();
        let calm = match self.sway {
            Some(sway) => {
                let elapsed = ((now_ms - sway.started_ms) / 1000.0) as f32;
                sway.params.offset(elapsed, !in_danger)
            }
            None => PoseOffset::ZERO,
        };

        self.offset = if in_danger {
            danger.shake
        } else if let Some((from, progress)) = danger.settling {
            from.lerp(&calm, ease_power2_out(progress))
        } else {
            calm
        };
    }

    /// Stop every motion and freeze at the current pose (minus tilt)
    pub fn stop(&mut self) {
        self.base += Vec2::new(self.offset.x, self.offset.y);
        self.offset = PoseOffset::ZERO;
        self.sway = None;
        self.still = true;
    }

    /// Sink by `distance` over `duration` seconds
    pub fn begin_descent(&mut self, distance: f32, duration: f32, now_ms: f64) {
        self.descent = Some(Glide::new(self.base.y, self.base.y + distance, now_ms, duration));
    }

    pub fn update_descent(&mut self, now_ms: f64) {
        if let Some(descent) = &self.descent {
            self.base.y = descent.value_at(now_ms);
        }
    }

    pub fn pose(&self) -> BalloonPose {
        BalloonPose {
            x: self.base.x + self.offset.x,
            y: self.base.y + self.offset.y,
            rotation: self.offset.rotation,
            scale_x: self.layout.scale * (1.0 + self.offset.scale_x),
            scale_y: self.layout.scale * (1.0 + self.offset.scale_y),
        }
    }

    pub fn position(&self) -> Vec2 {
        let pose = self.pose();
        Vec2::new(pose.x, pose.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::risk::DangerTracker;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn layout() -> BalloonLayout {
        BalloonLayout::from_viewport(Viewport::BASE)
    }

    #[test]
    fn responsive_scale_examples() {
        // 600 px tall counts as a small screen: 1.0 * 2.2
        assert!((responsive_scale(Viewport::BASE) - 2.2).abs() < 1e-5);
        // 1024x768 landscape: min(1.28, 1.28) * 1.3
        let desk = responsive_scale(Viewport::new(1024.0, 768.0).unwrap());
        assert!((desk - 1.28 * 1.3).abs() < 1e-4);
        // Phone portrait: min(0.47, 1.35) * 2.5
        let phone = responsive_scale(Viewport::new(375.0, 812.0).unwrap());
        assert!((phone - 375.0 / 800.0 * 2.5).abs() < 1e-4);
        // Big monitor clamps at 4.0
        assert_eq!(responsive_scale(Viewport::new(1920.0, 1080.0).unwrap()), 4.0);
        // Tiny canvas clamps at 0.8
        assert_eq!(responsive_scale(Viewport::new(100.0, 100.0).unwrap()), 0.8);
    }

    #[test]
    fn climbs_to_centre() {
        let mut balloon = Balloon::new(layout());
        let l = balloon.layout();
        assert_eq!(balloon.position().y, l.start_y);
        balloon.follow_ascent(200.0, 400.0);
        assert!((balloon.position().y - (l.start_y + l.target_y) / 2.0).abs() < 1e-3);
        balloon.follow_ascent(10_000.0, 400.0);
        assert_eq!(balloon.position().y, l.target_y);
    }

    #[test]
    fn danger_replaces_calm_motion() {
        let mut balloon = Balloon::new(layout());
        balloon.start_sway(SwayParams::draw(&mut Pcg32::seed_from_u64(1)), 0.0);
        let mut tracker = DangerTracker::new(3, 0.3);
        tracker.observe(0.95, 1000.0);
        let danger = tracker.observe(0.95, 1130.0);
        assert_ne!(danger.shake, PoseOffset::ZERO);
        balloon.apply_motion(&danger, 1130.0);
        let pose = balloon.pose();
        let l = layout();
        assert!((pose.x - (l.centre_x + danger.shake.x)).abs() < 1e-4);
        assert!((pose.y - (l.start_y + danger.shake.y)).abs() < 1e-4);
        assert_eq!(pose.rotation, danger.shake.rotation);
    }

    #[test]
    fn stop_freezes_pose() {
        let mut balloon = Balloon::new(layout());
        balloon.start_sway(SwayParams::draw(&mut Pcg32::seed_from_u64(2)), 0.0);
        balloon.apply_motion(&DangerResponse::calm(), 1500.0);
        let before = balloon.position();
        balloon.stop();
        assert_eq!(balloon.position(), before);
        assert!(!balloon.is_swaying());
        assert!(!balloon.start_sway(SwayParams::draw(&mut Pcg32::seed_from_u64(3)), 2000.0));
        balloon.apply_motion(&DangerResponse::calm(), 9000.0);
        assert_eq!(balloon.position(), before);
    }

    #[test]
    fn descent_sinks_and_settles() {
        let mut balloon = Balloon::new(layout());
        balloon.stop();
        let start = balloon.position().y;
        balloon.begin_descent(100.0, 2.0, 1000.0);
        balloon.update_descent(2000.0);
        let mid = balloon.position().y;
        // power2.out covers 75% at half time
        assert!((mid - (start + 75.0)).abs() < 1e-3);
        balloon.update_descent(5000.0);
        assert_eq!(balloon.position().y, start + 100.0);
        assert!(balloon.descent().unwrap().is_done(5000.0));
    }
}
