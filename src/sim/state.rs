//! Game state and session transitions
//!
//! `GameState` owns the session and every component that derives from it.
//! Transitions (start, land, pop, restart, delayed results) live here; the
//! per-tick flow lives in `tick`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ascent::AscentSimulator;
use super::balloon::{Balloon, BalloonLayout, BalloonPose};
use super::clouds::{Cloud, CloudField};
use super::deferred::{DeferredTasks, TaskKind};
use super::motion::SwayParams;
use super::particles::{Effect, ParticleSystem, ParticleView, RingView, SpawnReport};
use super::responsive::{ScaleProfile, Speeds, Viewport, compute_speeds};
use super::risk::{DangerTier, RiskScheduler};
use super::scenery::{Ground, Sky, cloud_visibility};
use crate::error::ViewportError;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen, nothing simulated
    Menu,
    /// Balloon climbing
    Playing,
    /// Player landed; descent and success screen pending
    Landed,
    /// Balloon burst; failure screen pending
    Popped,
    /// Result screen
    GameOver,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Landed,
    Popped,
}

/// One play-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: u64,
    pub start_time_ms: f64,
    /// Fixed when the session starts
    pub pop_time_ms: f64,
    pub altitude: f32,
    /// Always `floor(altitude * score_multiplier)`
    pub score: u64,
    /// Non-decreasing, 0-1
    pub risk_level: f32,
    pub elapsed_ms: f64,
    /// Distance the balloon has climbed on screen
    pub visual_position: f32,
    pub outcome: Option<Outcome>,
}

impl GameSession {
    pub fn new(id: u64, start_time_ms: f64, pop_time_ms: f64) -> Self {
        Self {
            id,
            start_time_ms,
            pop_time_ms,
            altitude: 0.0,
            score: 0,
            risk_level: 0.0,
            elapsed_ms: 0.0,
            visual_position: 0.0,
            outcome: None,
        }
    }

    /// Altitude as shown in the UI
    pub fn display_altitude(&self) -> u64 {
        self.altitude.floor().max(0.0) as u64
    }
}

/// Notifications for the UI layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted { session: u64 },
    DangerTierChanged { from: DangerTier, to: DangerTier },
    SwayStarted,
    Landed { score: u64 },
    DescentStarted,
    Popped { score: u64 },
    ParticleBurst(SpawnReport),
    GameOver { outcome: Outcome, score: u64 },
}

/// Everything the UI needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub session: u64,
    pub score: u64,
    /// Floored
    pub altitude: u64,
    pub risk_level: f32,
    pub danger_tier: DangerTier,
    pub outcome: Option<Outcome>,
    pub balloon: BalloonPose,
    pub sky_color: u32,
    pub star_alpha: f32,
    pub cloud_visibility: f32,
    pub ground_y: f32,
    /// Ground scroll below its resting line
    pub ground_offset: f32,
    pub clouds: Vec<Cloud>,
    pub particles: Vec<ParticleView>,
    /// Only rings whose delay has passed
    pub rings: Vec<RingView>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub session: GameSession,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub profile: ScaleProfile,
    pub ascent: AscentSimulator,
    pub risk: RiskScheduler,
    pub particles: ParticleSystem,
    pub clouds: CloudField,
    pub balloon: Balloon,
    pub ground: Ground,
    /// Delayed result steps, keyed by session
    pub tasks: DeferredTasks,
    /// Calm motion drawn for the current session
    pub sway: SwayParams,
    /// Simulation tick counter
    pub time_ticks: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
    next_session_id: u64,
}

impl GameState {
    /// Create a game sitting on the start screen
    ///
    /// A degenerate viewport falls back to the 800x600 baseline, and tuning
    /// that fails validation falls back to the defaults.
    pub fn new(seed: u64, width: f32, height: f32, tuning: Tuning) -> Self {
        let tuning = tuning.or_default_if_invalid();
        let (viewport, profile, speeds) = match Viewport::new(width, height)
            .and_then(|v| compute_speeds(v.width, v.height, &tuning).map(|(p, s)| (v, p, s)))
        {
            Ok(fit) => fit,
            Err(err) => {
                log::warn!("{}; using the baseline layout", err);
                let v = Viewport::BASE;
                let profile = ScaleProfile::from_viewport(v);
                let speeds = Speeds::from_profile(&profile, &tuning);
                (v, profile, speeds)
            }
        };

        let mut rng = Pcg32::seed_from_u64(seed);
        let compact = viewport.is_compact();
        let risk = RiskScheduler::new(
            tuning.effective_game_time_ms(compact),
            rng.random(),
            tuning.calm_transition_duration,
        );
        let sway = SwayParams::draw(&mut rng);
        let clouds = CloudField::new(rng.random(), viewport);
        let particles = ParticleSystem::new(rng.random());

        Self {
            seed,
            phase: GamePhase::Menu,
            session: GameSession::new(0, 0.0, 0.0),
            ascent: AscentSimulator::new(speeds, tuning.score_multiplier),
            risk,
            particles,
            clouds,
            balloon: Balloon::new(BalloonLayout::from_viewport(viewport)),
            ground: Ground::new(viewport),
            tasks: DeferredTasks::new(),
            sway,
            time_ticks: 0,
            tuning,
            viewport,
            profile,
            rng,
            events: Vec::new(),
            next_session_id: 1,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.viewport.is_compact()
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Apply new canvas dimensions
    ///
    /// Degenerate dimensions keep the previous profile and report the error.
    /// Only forward speed changes; altitude and score are untouched.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ViewportError> {
        let (viewport, (profile, speeds)) = match Viewport::new(width, height)
            .and_then(|v| compute_speeds(v.width, v.height, &self.tuning).map(|fit| (v, fit)))
        {
            Ok(fit) => fit,
            Err(err) => {
                log::warn!("Ignoring resize: {}", err);
                return Err(err);
            }
        };

        self.viewport = viewport;
        self.profile = profile;
        self.ascent.set_speeds(speeds);
        self.risk
            .set_effective_game_time(self.tuning.effective_game_time_ms(viewport.is_compact()));
        self.balloon.set_layout(
            BalloonLayout::from_viewport(viewport),
            self.session.visual_position,
            self.tuning.centre_position,
        );
        self.ground.relayout(viewport, self.session.altitude);
        self.clouds.relayout(viewport);
        log::debug!(
            "Viewport {}x{}: combined multiplier {:.3}",
            width,
            height,
            profile.combined()
        );
        Ok(())
    }

    /// Start screen -> playing
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.phase != GamePhase::Menu {
            return false;
        }
        self.begin_session(now_ms);
        true
    }

    /// Result (or pending result) -> fresh session
    ///
    /// Pending delayed steps are cancelled and particles cleared before the
    /// new session exists.
    pub fn restart(&mut self, now_ms: f64) -> bool {
        match self.phase {
            GamePhase::Landed | GamePhase::Popped | GamePhase::GameOver => {
                self.tasks.cancel_all();
                self.particles.clear();
                self.begin_session(now_ms);
                true
            }
            GamePhase::Menu | GamePhase::Playing => false,
        }
    }

    fn begin_session(&mut self, now_ms: f64) {
        let id = self.next_session_id;
        self.next_session_id += 1;

        let compact = self.is_compact();
        let pop_time_ms = RiskScheduler::draw_pop_time(&mut self.rng, now_ms, &self.tuning, compact);
        self.session = GameSession::new(id, now_ms, pop_time_ms);
        self.risk = RiskScheduler::new(
            self.tuning.effective_game_time_ms(compact),
            self.rng.random(),
            self.tuning.calm_transition_duration,
        );
        self.sway = SwayParams::draw(&mut self.rng);
        self.balloon = Balloon::new(BalloonLayout::from_viewport(self.viewport));
        self.ground = Ground::new(self.viewport);
        self.clouds = CloudField::new(self.rng.random(), self.viewport);
        self.phase = GamePhase::Playing;

        log::info!("Session {} started", id);
        log::debug!(
            "Session {}: pop in {:.0} ms, full risk at {:.0} ms",
            id,
            pop_time_ms - now_ms,
            self.risk.effective_game_time_ms()
        );
        self.emit(GameEvent::SessionStarted { session: id });
    }

    /// Playing -> landed; a no-op in any other phase
    ///
    /// A land command at or past the pop instant pops instead.
    pub fn land(&mut self, now_ms: f64) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        if self.risk.check_pop(&self.session, now_ms) {
            self.pop(now_ms);
            return false;
        }

        let id = self.session.id;
        let compact = self.is_compact();
        self.phase = GamePhase::Landed;
        self.session.outcome = Some(Outcome::Landed);
        self.balloon.stop();
        self.risk.danger_mut().reset();
        self.ground
            .begin_return(self.tuning.descent_duration(compact), now_ms);
        self.tasks
            .schedule(id, now_ms + self.tuning.descent_delay_ms, TaskKind::BeginDescent);
        self.tasks.schedule(
            id,
            now_ms + self.tuning.land_result_delay(compact),
            TaskKind::ShowSuccess,
        );

        log::info!(
            "Session {} landed at altitude {} with score {}",
            id,
            self.session.display_altitude(),
            self.session.score
        );
        self.emit(GameEvent::Landed {
            score: self.session.score,
        });
        self.burst(Effect::Success);
        true
    }

    /// Playing -> popped
    pub fn pop(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let id = self.session.id;
        self.phase = GamePhase::Popped;
        self.session.outcome = Some(Outcome::Popped);
        self.balloon.stop();
        self.risk.danger_mut().reset();
        self.tasks.schedule(
            id,
            now_ms + self.tuning.pop_result_delay_ms,
            TaskKind::ShowFailure,
        );

        log::info!(
            "Session {} popped after {:.1}s with score {}",
            id,
            self.session.elapsed_ms / 1000.0,
            self.session.score
        );
        self.emit(GameEvent::Popped {
            score: self.session.score,
        });
        self.burst(Effect::Pop);
    }

    fn burst(&mut self, effect: Effect) {
        let origin = self.balloon.position();
        let report = self.particles.trigger(effect, origin, self.is_compact());
        self.emit(GameEvent::ParticleBurst(report));
    }

    /// Run a delayed step that came due
    pub(crate) fn fire_task(&mut self, kind: TaskKind, now_ms: f64) {
        log::debug!("Session {}: {:?} due", self.session.id, kind);
        match (kind, self.phase) {
            (TaskKind::BeginDescent, GamePhase::Landed) => {
                let compact = self.is_compact();
                self.balloon.begin_descent(
                    self.tuning
                        .descent_distance(compact, self.viewport.is_portrait()),
                    self.tuning.descent_duration(compact),
                    now_ms,
                );
                self.emit(GameEvent::DescentStarted);
            }
            (TaskKind::ShowSuccess, GamePhase::Landed) | (TaskKind::ShowFailure, GamePhase::Popped) => {
                self.phase = GamePhase::GameOver;
                let outcome = match kind {
                    TaskKind::ShowSuccess => Outcome::Landed,
                    _ => Outcome::Popped,
                };
                log::info!(
                    "Session {} over ({:?}), final score {}",
                    self.session.id,
                    outcome,
                    self.session.score
                );
                self.emit(GameEvent::GameOver {
                    outcome,
                    score: self.session.score,
                });
            }
            (kind, phase) => {
                log::warn!("Skipping {:?} in phase {:?}", kind, phase);
            }
        }
    }

    /// Frame data for the UI layer
    pub fn snapshot(&self) -> GameSnapshot {
        let compact = self.is_compact();
        let altitude = self.session.altitude;
        let sky = Sky::at(altitude, compact);
        GameSnapshot {
            phase: self.phase,
            session: self.session.id,
            score: self.session.score,
            altitude: self.session.display_altitude(),
            risk_level: self.session.risk_level,
            danger_tier: DangerTier::from_risk(self.session.risk_level),
            outcome: self.session.outcome,
            balloon: self.balloon.pose(),
            sky_color: sky.color,
            star_alpha: sky.star_alpha,
            cloud_visibility: cloud_visibility(altitude, compact),
            ground_y: self.ground.y(),
            ground_offset: self.ground.y() - self.ground.start_y(),
            clouds: self.clouds.clouds().to_vec(),
            particles: self.particles.particle_views(),
            rings: self.particles.ring_views(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(42, 800.0, 600.0, Tuning::default())
    }

    #[test]
    fn test_new_state_is_menu() {
        let state = state();
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.session.score, 0);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_degenerate_viewport_falls_back() {
        let state = GameState::new(1, 0.0, 600.0, Tuning::default());
        assert_eq!(state.viewport, Viewport::BASE);
    }

    #[test]
    fn test_start_only_from_menu() {
        let mut state = state();
        assert!(state.start(1000.0));
        assert_eq!(state.phase, GamePhase::Playing);
        let pop = state.session.pop_time_ms;
        assert!(!state.start(2000.0));
        assert_eq!(state.session.pop_time_ms, pop);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::SessionStarted { session: 1 }]
        );
    }

    #[test]
    fn test_pop_window() {
        let mut state = state();
        state.start(0.0);
        let s = &state.session;
        assert!(s.pop_time_ms >= 20_000.0);
        assert!(s.pop_time_ms < 50_000.0);
    }

    #[test]
    fn test_land_schedules_result() {
        let mut state = state();
        state.start(0.0);
        assert!(state.land(5000.0));
        assert_eq!(state.phase, GamePhase::Landed);
        assert_eq!(state.session.outcome, Some(Outcome::Landed));
        assert_eq!(state.tasks.len(), 2);
        assert!(state.balloon.is_still());
        // Only one outcome per session
        state.pop(5001.0);
        assert_eq!(state.phase, GamePhase::Landed);
        assert!(!state.land(5002.0));

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Landed { score: 0 }));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ParticleBurst(r) if r.effect == Effect::Success
        )));
    }

    #[test]
    fn test_land_past_pop_time_pops() {
        let mut state = state();
        state.start(0.0);
        let late = state.session.pop_time_ms;
        assert!(!state.land(late));
        assert_eq!(state.phase, GamePhase::Popped);
    }

    #[test]
    fn test_delayed_steps_fire_in_phase() {
        let mut state = state();
        state.start(0.0);
        state.land(1000.0);
        state.fire_task(TaskKind::BeginDescent, 1100.0);
        assert!(state.balloon.descent().is_some());
        state.fire_task(TaskKind::ShowFailure, 1200.0);
        assert_eq!(state.phase, GamePhase::Landed);
        state.fire_task(TaskKind::ShowSuccess, 3500.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::GameOver { outcome: Outcome::Landed, score: 0 })
        );
    }

    #[test]
    fn test_restart_resets_session() {
        let mut state = state();
        state.start(0.0);
        state.session.altitude = 50.0;
        state.session.score = 500;
        state.session.risk_level = 0.7;
        state.pop(30_000.0);
        assert!(!state.particles.is_empty());

        assert!(state.restart(30_500.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.session.id, 2);
        assert_eq!(state.session.altitude, 0.0);
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.risk_level, 0.0);
        assert!(state.particles.is_empty());
        assert!(state.particles.rings().is_empty());
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut state = state();
        assert!(!state.restart(0.0));
        state.start(0.0);
        assert!(!state.restart(10.0));
        assert_eq!(state.session.id, 1);
    }

    #[test]
    fn test_resize_rejects_degenerate() {
        let mut state = state();
        let speeds = state.ascent.speeds();
        assert!(state.resize(0.0, 600.0).is_err());
        assert!(state.resize(800.0, f32::NAN).is_err());
        assert_eq!(state.ascent.speeds(), speeds);
        assert_eq!(state.viewport, Viewport::BASE);
    }

    #[test]
    fn test_resize_changes_forward_speed_only() {
        let mut state = state();
        state.start(0.0);
        state.session.altitude = 12.5;
        state.session.score = 125;
        state.resize(375.0, 812.0).unwrap();
        assert_eq!(state.session.altitude, 12.5);
        assert_eq!(state.session.score, 125);
        assert!((state.ascent.speeds().altitude - 0.216).abs() < 1e-4);
        assert!((state.risk.effective_game_time_ms() - 70_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = state();
        state.start(0.0);
        let snap = state.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.danger_tier, DangerTier::Calm);
        let json = serde_json::to_string(&snap).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);

        let pop_at = state.session.pop_time_ms;
        state.pop(pop_at);
        let snap = state.snapshot();
        assert_eq!(snap.phase, GamePhase::Popped);
        assert_eq!(snap.particles.len(), 72);
        assert!(snap.particles.iter().all(|p| p.alpha > 0.0 && p.alpha <= 1.0));
        // Shockwave and the first pressure ring; the rest are still delayed
        assert_eq!(snap.rings.len(), 2);

        let value: serde_json::Value = serde_json::to_value(&snap).unwrap();
        let first = &value["particles"][0];
        for key in ["pos", "alpha", "size", "rotation", "category"] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_invalid_tuning_falls_back_to_defaults() {
        let tuning = Tuning {
            min_safe_time_ms: 50_000.0,
            max_game_time_ms: 40_000.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(13, 800.0, 600.0, tuning);
        assert_eq!(state.tuning, Tuning::default());
        assert!(state.start(0.0));
        let pop_in = state.session.pop_time_ms;
        assert!((20_000.0..50_000.0).contains(&pop_in));

        let inverted_speeds = Tuning {
            altitude_speed_range: (1.2, 0.2),
            ..Tuning::default()
        };
        let mut state = GameState::new(14, 375.0, 812.0, inverted_speeds);
        assert!(state.start(0.0));
        let speed = state.ascent.speeds().altitude;
        assert!((0.2..=1.2).contains(&speed));
    }
}
