//! Parallax cloud field
//!
//! Five depth layers; nearer layers are bigger, brighter and scroll faster
//! while the balloon climbs. Clouds that fall off the bottom respawn above
//! the top edge.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::responsive::Viewport;

/// Horizontal margin kept free of cloud centres
const EDGE_PADDING: f32 = 100.0;
/// Fraction of the ascent speed that feeds cloud scrolling
const ASCENT_PARALLAX: f32 = 0.8;

/// Depth layer, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CloudLayer {
    FarBackground,
    Background,
    Middle,
    Foreground,
    Near,
}

/// Per-layer look and motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub vertical_multiplier: f32,
    pub scale: (f32, f32),
    pub alpha: (f32, f32),
    pub tint: (f32, f32),
    /// Constant downward drift per tick
    pub drift: f32,
    /// Clouds on a wide screen
    pub base_count: u32,
}

impl CloudLayer {
    pub const ALL: [CloudLayer; 5] = [
        CloudLayer::FarBackground,
        CloudLayer::Background,
        CloudLayer::Middle,
        CloudLayer::Foreground,
        CloudLayer::Near,
    ];

    pub fn spec(&self) -> LayerSpec {
        match self {
            CloudLayer::FarBackground => LayerSpec {
                vertical_multiplier: 0.05,
                scale: (0.15, 0.25),
                alpha: (0.2, 0.35),
                tint: (0.5, 0.65),
                drift: 0.3,
                base_count: 2,
            },
            CloudLayer::Background => LayerSpec {
                vertical_multiplier: 0.15,
                scale: (0.25, 0.4),
                alpha: (0.35, 0.5),
                tint: (0.65, 0.75),
                drift: 0.4,
                base_count: 2,
            },
            CloudLayer::Middle => LayerSpec {
                vertical_multiplier: 0.3,
                scale: (0.4, 0.6),
                alpha: (0.5, 0.7),
                tint: (0.75, 0.85),
                drift: 0.5,
                base_count: 3,
            },
            CloudLayer::Foreground => LayerSpec {
                vertical_multiplier: 0.5,
                scale: (0.6, 0.8),
                alpha: (0.7, 0.85),
                tint: (0.85, 0.95),
                drift: 0.6,
                base_count: 2,
            },
            CloudLayer::Near => LayerSpec {
                vertical_multiplier: 0.8,
                scale: (0.8, 1.2),
                alpha: (0.8, 1.0),
                tint: (0.9, 1.0),
                drift: 0.7,
                base_count: 1,
            },
        }
    }

    /// Clouds of this layer for a screen class
    pub fn count(&self, compact: bool) -> u32 {
        let base = self.spec().base_count as f32;
        if compact {
            (base * 0.4).round() as u32
        } else {
            base as u32
        }
    }

    /// Vertical band a cloud is clamped into on resize
    fn resize_band(&self, height: f32) -> (f32, f32) {
        if *self <= CloudLayer::Background {
            (0.0, height * 0.4)
        } else {
            (height * 0.15, height * 0.75)
        }
    }
}

fn in_range<R: Rng>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// One cloud
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub layer: CloudLayer,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// Opacity before the altitude fade
    pub base_alpha: f32,
    /// Opacity after the altitude fade
    pub alpha: f32,
    /// Grey level; blue channel is lifted by 0.1
    pub tint: f32,
    /// Own falling speed per tick
    pub vertical_speed: f32,
}

impl Cloud {
    fn new<R: Rng>(rng: &mut R, layer: CloudLayer, x: f32, y: f32, compact: bool) -> Self {
        let mut cloud = Self {
            layer,
            x,
            y,
            scale: 0.0,
            base_alpha: 0.0,
            alpha: 0.0,
            tint: 0.0,
            vertical_speed: 0.0,
        };
        cloud.restyle(rng, compact);
        cloud
    }

    fn restyle<R: Rng>(&mut self, rng: &mut R, compact: bool) {
        let spec = self.layer.spec();
        let scale_mult = if compact { 0.7 } else { 1.0 };
        self.vertical_speed = (rng.random::<f32>() * 0.5 + 0.3) * spec.vertical_multiplier;
        self.scale = in_range(rng, spec.scale) * scale_mult;
        self.base_alpha = in_range(rng, spec.alpha);
        self.alpha = self.base_alpha;
        self.tint = in_range(rng, spec.tint);
    }

    /// Tint as 0xRRGGBB
    pub fn tint_rgb(&self) -> u32 {
        let grey = (self.tint * 255.0).round() as u32;
        let blue = ((self.tint + 0.1).min(1.0) * 255.0).round() as u32;
        (grey << 16) | (grey << 8) | blue
    }

    pub fn is_visible(&self) -> bool {
        self.alpha > 0.01
    }
}

/// All clouds of a session, drawn back to front
#[derive(Debug, Clone)]
pub struct CloudField {
    clouds: Vec<Cloud>,
    rng: Pcg32,
    viewport: Viewport,
}

impl CloudField {
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let compact = viewport.is_compact();
        let mut clouds = Vec::new();
        for layer in CloudLayer::ALL {
            for _ in 0..layer.count(compact) {
                let (x, y) = spawn_point(&mut rng, viewport);
                clouds.push(Cloud::new(&mut rng, layer, x, y, compact));
            }
        }
        log::debug!(
            "Cloud field: {} clouds for {}x{}",
            clouds.len(),
            viewport.width,
            viewport.height
        );
        Self {
            clouds,
            rng,
            viewport,
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    /// One tick of scrolling; `visibility` is the altitude fade factor
    pub fn advance(&mut self, ascent_speed: f32, visibility: f32) {
        let visibility = visibility.clamp(0.0, 1.0);
        let limit = self.viewport.height + 100.0;
        for cloud in &mut self.clouds {
            let spec = cloud.layer.spec();
            cloud.y += cloud.vertical_speed
                + ascent_speed * ASCENT_PARALLAX * spec.vertical_multiplier
                + spec.drift;
            if cloud.y > limit {
                let (x, y) = spawn_point(&mut self.rng, self.viewport);
                cloud.x = x;
                cloud.y = y;
            }
            cloud.alpha = cloud.base_alpha * visibility;
        }
    }

    /// Fit existing clouds to a new canvas
    pub fn relayout(&mut self, viewport: Viewport) {
        let old = self.viewport;
        let compact = viewport.is_compact();
        let max_x = (viewport.width - EDGE_PADDING).max(EDGE_PADDING);
        for cloud in &mut self.clouds {
            let x = cloud.x / old.width * viewport.width;
            cloud.x = x.clamp(EDGE_PADDING, max_x);
            let (lo, hi) = cloud.layer.resize_band(viewport.height);
            cloud.y = cloud.y.clamp(lo, hi);
            cloud.restyle(&mut self.rng, compact);
        }
        self.viewport = viewport;
    }
}

/// Fresh position above the top edge
fn spawn_point<R: Rng>(rng: &mut R, viewport: Viewport) -> (f32, f32) {
    let span = (viewport.width - 2.0 * EDGE_PADDING).max(0.0);
    let x = EDGE_PADDING + rng.random::<f32>() * span;
    let y = -200.0 - rng.random::<f32>() * 300.0;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_screen_class() {
        let wide = CloudField::new(1, Viewport::new(1280.0, 720.0).unwrap());
        assert_eq!(wide.len(), 10);
        let compact = CloudField::new(1, Viewport::new(375.0, 812.0).unwrap());
        assert_eq!(compact.len(), 4);
        assert!(compact.clouds().iter().all(|c| c.layer != CloudLayer::Near));
    }

    #[test]
    fn ordered_back_to_front() {
        let field = CloudField::new(3, Viewport::new(1280.0, 720.0).unwrap());
        let layers: Vec<_> = field.clouds().iter().map(|c| c.layer).collect();
        let mut sorted = layers.clone();
        sorted.sort();
        assert_eq!(layers, sorted);
    }

    #[test]
    fn spawn_above_screen() {
        let viewport = Viewport::new(1280.0, 720.0).unwrap();
        let field = CloudField::new(5, viewport);
        for cloud in field.clouds() {
            assert!(cloud.y <= -200.0 && cloud.y >= -500.0);
            assert!(cloud.x >= 100.0 && cloud.x <= 1180.0);
            let spec = cloud.layer.spec();
            assert!(cloud.scale >= spec.scale.0 && cloud.scale <= spec.scale.1);
        }
    }

    #[test]
    fn nearer_layers_fall_faster() {
        let viewport = Viewport::new(1280.0, 720.0).unwrap();
        let mut field = CloudField::new(8, viewport);
        let before: Vec<f32> = field.clouds().iter().map(|c| c.y).collect();
        field.advance(2.0, 1.0);
        let moved = |layer| {
            field
                .clouds()
                .iter()
                .zip(&before)
                .filter(|(c, _)| c.layer == layer)
                .map(|(c, y)| c.y - y)
                .fold(f32::MIN, f32::max)
        };
        assert!(moved(CloudLayer::Near) > moved(CloudLayer::FarBackground));
    }

    #[test]
    fn clouds_wrap_to_top() {
        let viewport = Viewport::new(1280.0, 720.0).unwrap();
        let mut field = CloudField::new(13, viewport);
        for _ in 0..5000 {
            field.advance(2.0, 1.0);
            for cloud in field.clouds() {
                assert!(cloud.y <= 820.0 + 2.0);
            }
        }
    }

    #[test]
    fn fade_scales_alpha() {
        let mut field = CloudField::new(21, Viewport::new(1280.0, 720.0).unwrap());
        field.advance(0.0, 0.5);
        for cloud in field.clouds() {
            assert!((cloud.alpha - cloud.base_alpha * 0.5).abs() < 1e-6);
        }
        field.advance(0.0, 0.0);
        assert!(field.clouds().iter().all(|c| !c.is_visible()));
    }

    #[test]
    fn relayout_clamps_into_bands() {
        let mut field = CloudField::new(34, Viewport::new(1280.0, 720.0).unwrap());
        let small = Viewport::new(400.0, 700.0).unwrap();
        field.relayout(small);
        for cloud in field.clouds() {
            assert!(cloud.x >= 100.0 && cloud.x <= 300.0);
            let (lo, hi) = cloud.layer.resize_band(700.0);
            assert!(cloud.y >= lo && cloud.y <= hi);
            // Compact styling
            assert!(cloud.scale <= cloud.layer.spec().scale.1 * 0.7 + 1e-6);
        }
    }

    #[test]
    fn tint_lifts_blue() {
        let mut field = CloudField::new(2, Viewport::new(1280.0, 720.0).unwrap());
        field.advance(0.0, 1.0);
        let cloud = field.clouds()[0];
        let rgb = cloud.tint_rgb();
        assert!(rgb & 0xFF >= (rgb >> 16) & 0xFF);
    }
}
