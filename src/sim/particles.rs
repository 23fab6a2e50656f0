//! Decorative particle physics
//!
//! Independent of the game phase: the state machine only triggers spawn
//! batches and clears the pool on restart. Velocities and gravity are in
//! pixels per 60 Hz tick (the rate the effects were tuned at); life is in
//! seconds.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICK_RATE;

/// Maximum live particles; the oldest are evicted first
pub const MAX_PARTICLES: usize = 512;

/// Visual family of a particle (cosmetic only, the physics is shared)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleCategory {
    Confetti,
    Star,
    Fragment,
    Debris,
    Smoke,
    Spark,
}

/// Spawn parameters for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSpec {
    /// Side of the square the particles appear in, centred on the origin
    pub spread: f32,
    /// Horizontal velocity range is [-vx_half, vx_half)
    pub vx_half: f32,
    /// Vertical velocity range (negative is up)
    pub vy: (f32, f32),
    /// Size range (pixels)
    pub size: (f32, f32),
    /// Lifetime (seconds)
    pub life: f32,
    /// Per-tick vertical acceleration; negative floats upward
    pub gravity: f32,
    /// Spin range (radians per tick, either direction)
    pub spin: f32,
}

impl ParticleCategory {
    pub const ALL: [ParticleCategory; 6] = [
        ParticleCategory::Confetti,
        ParticleCategory::Star,
        ParticleCategory::Fragment,
        ParticleCategory::Debris,
        ParticleCategory::Smoke,
        ParticleCategory::Spark,
    ];

    /// Spawn table
    pub fn spec(&self) -> SpawnSpec {
        match self {
            ParticleCategory::Confetti => SpawnSpec {
                spread: 20.0,
                vx_half: 4.0,
                vy: (-8.0, -2.0),
                size: (4.0, 8.0),
                life: 1.0,
                gravity: 0.2,
                spin: 0.2,
            },
            ParticleCategory::Star => SpawnSpec {
                spread: 30.0,
                vx_half: 3.0,
                vy: (-5.0, -1.0),
                size: (4.0, 8.0),
                life: 1.5,
                gravity: 0.1,
                spin: 0.0,
            },
            ParticleCategory::Fragment => SpawnSpec {
                spread: 60.0,
                vx_half: 7.5,
                vy: (-15.0, -3.0),
                size: (4.0, 12.0),
                life: 2.0,
                gravity: 0.4,
                spin: 0.1,
            },
            ParticleCategory::Debris => SpawnSpec {
                spread: 80.0,
                vx_half: 6.0,
                vy: (-12.0, -2.0),
                size: (1.0, 4.0),
                life: 1.5,
                gravity: 0.35,
                spin: 0.0,
            },
            ParticleCategory::Smoke => SpawnSpec {
                spread: 20.0,
                vx_half: 1.5,
                vy: (-3.0, -1.0),
                size: (5.0, 13.0),
                life: 2.0,
                gravity: -0.05,
                spin: 0.0,
            },
            ParticleCategory::Spark => SpawnSpec {
                spread: 30.0,
                vx_half: 4.0,
                vy: (-7.0, -1.0),
                size: (2.0, 2.0),
                life: 0.8,
                gravity: 0.1,
                spin: 0.0,
            },
        }
    }

    /// Compact screens get a tighter, slower burst for some categories
    fn compact_scale(&self) -> (f32, f32) {
        // (spread, velocity)
        match self {
            ParticleCategory::Confetti => (0.75, 0.7),
            ParticleCategory::Star => (0.67, 0.8),
            _ => (1.0, 1.0),
        }
    }
}

/// Named effect batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Balloon burst
    Pop,
    /// Safe landing celebration
    Success,
}

impl Effect {
    /// Particle counts per category
    pub fn batch(&self, compact: bool) -> &'static [(ParticleCategory, usize)] {
        match (self, compact) {
            (Effect::Pop, _) => &[
                (ParticleCategory::Fragment, 25),
                (ParticleCategory::Debris, 15),
                (ParticleCategory::Smoke, 20),
                (ParticleCategory::Spark, 12),
            ],
            (Effect::Success, false) => &[(ParticleCategory::Confetti, 20), (ParticleCategory::Star, 8)],
            (Effect::Success, true) => &[(ParticleCategory::Confetti, 15), (ParticleCategory::Star, 6)],
        }
    }

    /// Rings accompanying the batch: (start radius, end scale, delay s, duration s)
    fn rings(&self) -> &'static [(f32, f32, f32, f32)] {
        match self {
            // Shockwave plus three pressure rings 150 ms apart
            Effect::Pop => &[
                (20.0, 8.0, 0.0, 0.3),
                (5.0, 6.0, 0.0, 0.5),
                (5.0, 6.0, 0.15, 0.5),
                (5.0, 6.0, 0.3, 0.5),
            ],
            Effect::Success => &[],
        }
    }
}

/// A single decorative particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life (seconds)
    pub life: f32,
    pub max_life: f32,
    pub gravity: f32,
    pub category: ParticleCategory,
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
}

impl Particle {
    /// Opacity derived from remaining life
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).max(0.0)
    }

    /// One integration step; `steps` is the tick count `dt` represents
    fn integrate(&mut self, dt: f32, steps: f32) {
        self.vel.y += self.gravity * steps;
        self.pos += self.vel * steps;
        self.rotation += self.spin * steps;
        self.life -= dt;
    }
}

/// Expanding outline ring (shockwave / pressure ring)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub pos: Vec2,
    pub radius: f32,
    pub end_scale: f32,
    /// Seconds until the ring appears
    pub delay: f32,
    /// Seconds since the ring appeared
    pub age: f32,
    pub duration: f32,
}

impl Ring {
    pub fn is_visible(&self) -> bool {
        self.delay <= 0.0
    }

    pub fn progress(&self) -> f32 {
        (self.age / self.duration).clamp(0.0, 1.0)
    }

    pub fn scale(&self) -> f32 {
        crate::lerp(1.0, self.end_scale, crate::ease_power2_out(self.progress()))
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.progress()
    }
}

/// What the renderer draws for one particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub alpha: f32,
    pub size: f32,
    pub rotation: f32,
    pub category: ParticleCategory,
}

impl From<&Particle> for ParticleView {
    fn from(p: &Particle) -> Self {
        Self {
            pos: p.pos,
            alpha: p.alpha(),
            size: p.size,
            rotation: p.rotation,
            category: p.category,
        }
    }
}

/// What the renderer draws for one ring; `radius * scale` is the outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingView {
    pub pos: Vec2,
    pub radius: f32,
    pub scale: f32,
    pub alpha: f32,
}

impl From<&Ring> for RingView {
    fn from(r: &Ring) -> Self {
        Self {
            pos: r.pos,
            radius: r.radius,
            scale: r.scale(),
            alpha: r.alpha(),
        }
    }
}

/// Summary of one spawn batch, forwarded to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnReport {
    pub effect: Effect,
    pub pos: Vec2,
    pub counts: Vec<(ParticleCategory, usize)>,
}

impl SpawnReport {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Owns every live particle and ring
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rings: Vec<Ring>,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            rings: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Drawable state of every live particle, oldest first
    pub fn particle_views(&self) -> Vec<ParticleView> {
        self.particles.iter().map(ParticleView::from).collect()
    }

    /// Drawable state of the rings whose delay has passed
    pub fn ring_views(&self) -> Vec<RingView> {
        self.rings
            .iter()
            .filter(|r| r.is_visible())
            .map(RingView::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty() && self.rings.is_empty()
    }

    /// Spawn `count` particles of one category around `origin`
    pub fn spawn(&mut self, category: ParticleCategory, origin: Vec2, count: usize, compact: bool) {
        let spec = category.spec();
        let (spread_k, vel_k) = if compact {
            category.compact_scale()
        } else {
            (1.0, 1.0)
        };
        let spread = spec.spread * spread_k;

        // Evict the oldest in one pass; a batch larger than the pool keeps its newest
        let count = count.min(MAX_PARTICLES);
        let excess = (self.particles.len() + count).saturating_sub(MAX_PARTICLES);
        if excess > 0 {
            self.particles.drain(..excess);
        }

        for _ in 0..count {
            let rng = &mut self.rng;
            let offset = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * spread;
            let vx = (rng.random::<f32>() - 0.5) * 2.0 * spec.vx_half * vel_k;
            let vy = crate::lerp(spec.vy.0, spec.vy.1, rng.random::<f32>()) * vel_k;
            let size = crate::lerp(spec.size.0, spec.size.1, rng.random::<f32>());
            let spin = (rng.random::<f32>() - 0.5) * 2.0 * spec.spin;

            self.particles.push(Particle {
                pos: origin + offset,
                vel: Vec2::new(vx, vy),
                life: spec.life,
                max_life: spec.life,
                gravity: spec.gravity,
                category,
                size,
                rotation: 0.0,
                spin,
            });
        }
    }

    /// Spawn a whole effect batch and report what was created
    pub fn trigger(&mut self, effect: Effect, origin: Vec2, compact: bool) -> SpawnReport {
        let batch = effect.batch(compact);
        for &(category, count) in batch {
            self.spawn(category, origin, count, compact);
        }
        for &(radius, end_scale, delay, duration) in effect.rings() {
            self.rings.push(Ring {
                pos: origin,
                radius,
                end_scale,
                delay,
                age: 0.0,
                duration,
            });
        }

        let report = SpawnReport {
            effect,
            pos: origin,
            counts: batch.to_vec(),
        };
        log::debug!(
            "{:?} effect at ({:.0}, {:.0}): {} particles, {} rings",
            effect,
            origin.x,
            origin.y,
            report.total(),
            effect.rings().len()
        );
        report
    }

    /// Advance every particle and ring by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let steps = dt * TICK_RATE;
        for particle in self.particles.iter_mut() {
            particle.integrate(dt, steps);
        }
        // Remove dead particles
        self.particles.retain(|p| p.life > 0.0);

        for ring in self.rings.iter_mut() {
            if ring.delay > 0.0 {
                ring.delay -= dt;
                if ring.delay < 0.0 {
                    ring.age = -ring.delay;
                    ring.delay = 0.0;
                }
            } else {
                ring.age += dt;
            }
        }
        self.rings.retain(|r| r.age < r.duration);
    }

    /// Drop everything immediately (session restart)
    pub fn clear(&mut self) {
        self.particles.clear();
        self.rings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    #[test]
    fn pop_spawns_full_batch() {
        let mut system = ParticleSystem::new(1);
        let report = system.trigger(Effect::Pop, Vec2::new(400.0, 300.0), false);
        assert_eq!(report.total(), 72);
        assert_eq!(system.len(), 72);
        assert_eq!(system.rings().len(), 4);
        // Smoke floats, everything else falls
        assert!(
            system
                .particles()
                .iter()
                .filter(|p| p.category == ParticleCategory::Smoke)
                .all(|p| p.gravity < 0.0)
        );
    }

    #[test]
    fn success_is_lighter_on_compact() {
        let mut system = ParticleSystem::new(2);
        assert_eq!(system.trigger(Effect::Success, Vec2::ZERO, false).total(), 28);
        system.clear();
        assert_eq!(system.trigger(Effect::Success, Vec2::ZERO, true).total(), 21);
    }

    #[test]
    fn integration_matches_single_tick() {
        let mut system = ParticleSystem::new(3);
        system.particles.push(Particle {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::new(1.0, -2.0),
            life: 1.0,
            max_life: 1.0,
            gravity: 0.5,
            category: ParticleCategory::Debris,
            size: 2.0,
            rotation: 0.0,
            spin: 0.0,
        });
        system.advance(SIM_DT);
        let p = &system.particles()[0];
        assert!((p.vel.y - -1.5).abs() < 1e-5);
        assert!((p.pos.x - 11.0).abs() < 1e-5);
        assert!((p.pos.y - 8.5).abs() < 1e-5);
        assert!((p.life - (1.0 - SIM_DT)).abs() < 1e-6);
        assert!((p.alpha() - p.life).abs() < 1e-6);
    }

    #[test]
    fn all_particles_expire() {
        let mut system = ParticleSystem::new(4);
        system.trigger(Effect::Pop, Vec2::ZERO, false);
        // Longest life is 2 s
        for _ in 0..(2.0 / SIM_DT) as usize + 2 {
            system.advance(SIM_DT);
        }
        assert!(system.is_empty());
    }

    #[test]
    fn delayed_rings_appear_later() {
        let mut system = ParticleSystem::new(5);
        system.trigger(Effect::Pop, Vec2::ZERO, false);
        let visible = |s: &ParticleSystem| s.rings().iter().filter(|r| r.is_visible()).count();
        assert_eq!(visible(&system), 2);
        for _ in 0..10 {
            system.advance(SIM_DT);
        }
        assert_eq!(visible(&system), 3);
    }

    #[test]
    fn clear_drops_pending_rings() {
        let mut system = ParticleSystem::new(6);
        system.trigger(Effect::Pop, Vec2::ZERO, false);
        system.clear();
        assert!(system.is_empty());
        system.advance(0.5);
        assert!(system.rings().is_empty());
    }

    #[test]
    fn pool_is_capped() {
        let mut system = ParticleSystem::new(7);
        for _ in 0..10 {
            system.trigger(Effect::Pop, Vec2::ZERO, false);
        }
        assert_eq!(system.len(), MAX_PARTICLES);
    }

    #[test]
    fn eviction_drops_oldest_first() {
        let mut system = ParticleSystem::new(8);
        system.spawn(ParticleCategory::Smoke, Vec2::ZERO, MAX_PARTICLES - 10, false);
        system.spawn(ParticleCategory::Spark, Vec2::ZERO, 30, false);
        assert_eq!(system.len(), MAX_PARTICLES);
        let smoke = system
            .particles()
            .iter()
            .take_while(|p| p.category == ParticleCategory::Smoke)
            .count();
        assert_eq!(smoke, MAX_PARTICLES - 30);
        assert!(system.particles()[smoke..].iter().all(|p| p.category == ParticleCategory::Spark));

        // Oversized batch keeps only its own particles
        system.spawn(ParticleCategory::Debris, Vec2::ZERO, MAX_PARTICLES * 3, false);
        assert_eq!(system.len(), MAX_PARTICLES);
        assert!(system.particles().iter().all(|p| p.category == ParticleCategory::Debris));
    }

    #[test]
    fn views_follow_live_state() {
        let mut system = ParticleSystem::new(9);
        system.trigger(Effect::Pop, Vec2::new(100.0, 200.0), false);
        for _ in 0..5 {
            system.advance(SIM_DT);
        }
        let views = system.particle_views();
        assert_eq!(views.len(), system.len());
        for (view, p) in views.iter().zip(system.particles()) {
            assert_eq!(view.pos, p.pos);
            assert_eq!(view.alpha, p.alpha());
            assert_eq!(view.category, p.category);
        }
        // Third and fourth pressure rings are still delayed
        let rings = system.ring_views();
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|r| r.alpha > 0.0 && r.alpha < 1.0 && r.scale > 1.0));
    }

    proptest! {
        #[test]
        fn life_strictly_decreases_until_removed(seed in any::<u64>(), ticks in 1usize..200) {
            let mut system = ParticleSystem::new(seed);
            system.trigger(Effect::Pop, Vec2::ZERO, false);
            system.trigger(Effect::Success, Vec2::ZERO, seed % 2 == 0);
            for _ in 0..ticks {
                let before: Vec<f32> = system.particles().iter().map(|p| p.life).collect();
                let survivors = before.iter().filter(|&&l| l - SIM_DT > 0.0).count();
                system.advance(SIM_DT);
                // Particles keep their relative order, so survivors line up
                let after: Vec<f32> = system.particles().iter().map(|p| p.life).collect();
                prop_assert_eq!(after.len(), survivors);
                prop_assert!(after.iter().all(|&l| l > 0.0));
                let mut expected = before.iter().filter(|&&l| l - SIM_DT > 0.0);
                for life in after {
                    let prev = expected.next().copied().unwrap_or(f32::MAX);
                    prop_assert!(life < prev);
                }
            }
        }
    }
}
