//! Session controller
//!
//! Owns one `SessionState`, the timer queue that drives it, the HUD sink
//! and the storage slot. Hosts call `start`/`restart`, forward pointer
//! presses to `pointer_down`, and call `frame` once per animation frame
//! until it returns false.

use glam::Vec2;

use crate::consts::*;
use crate::highscores::HighScore;
use crate::hud::{HudSink, HudSnapshot, SessionSummary};
use crate::persistence::Storage;
use crate::renderer::{self, Surface};
use crate::settings::Settings;
use crate::sim::{
    self, Bounds, EffectKind, GameEvent, GamePhase, HitOutcome, Scheduler, SessionState,
};
use crate::tuning::Tuning;

/// Everything the session schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Once-a-second countdown (slower under Slow Time)
    Countdown,
    /// Periodic target spawn
    SpawnTarget,
    /// Periodic power-up spawn
    SpawnPowerUp,
    /// Chained extra target
    ChainSpawn,
    /// Drop a hit target
    RemoveTarget(u32),
    /// Drop a collected power-up
    RemovePowerUp(u32),
    /// Combo streak timeout
    ComboDecay,
}

/// Spreads per-session seeds apart
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct Session<H: HudSink, S: Storage> {
    tuning: Tuning,
    settings: Settings,
    state: SessionState,
    scheduler: Scheduler<Job>,
    hud: H,
    storage: S,
    high_score: HighScore,
    /// Chained spawns waiting on the scheduler
    pending_chain: u32,
    last_frame_at: Option<f64>,
    seed: u64,
    sessions_started: u64,
    last_summary: Option<SessionSummary>,
}

impl<H: HudSink, S: Storage> Session<H, S> {
    /// Create a session in the Intro phase, loading the high score and settings
    pub fn new(tuning: Tuning, hud: H, storage: S, seed: u64, bounds: Bounds) -> Self {
        let high_score = HighScore::load(&storage);
        let settings = Settings::load(&storage);
        let mut state = SessionState::new(&tuning, seed, bounds);
        state.high_score = high_score.best;
        Self {
            tuning,
            settings,
            state,
            scheduler: Scheduler::new(),
            hud,
            storage,
            high_score,
            pending_chain: 0,
            last_frame_at: None,
            seed,
            sessions_started: 0,
            last_summary: None,
        }
    }

    /// Reset all state, arm the drivers and enter Playing
    pub fn start(&mut self, now: f64) {
        self.scheduler.clear();
        self.sessions_started += 1;
        let seed = self
            .seed
            .wrapping_add(self.sessions_started.wrapping_mul(SEED_STRIDE));
        self.state.reset(&self.tuning, seed);
        self.state.high_score = self.high_score.best;
        self.state.phase = GamePhase::Playing;
        self.pending_chain = 0;
        self.last_frame_at = Some(now);
        self.last_summary = None;

        self.scheduler
            .every(now, self.tuning.countdown_interval_ms, Job::Countdown);
        self.scheduler
            .every(now, self.tuning.target_spawn_interval_ms, Job::SpawnTarget);
        self.scheduler
            .every(now, self.tuning.power_up_spawn_interval_ms, Job::SpawnPowerUp);

        log::info!(
            "Session {} started ({}s, {} lives)",
            self.sessions_started,
            self.tuning.session_seconds,
            self.tuning.starting_lives
        );
        self.state.events.push(GameEvent::SessionStarted);
        self.spawn_target(now);
        self.push_hud(now);
    }

    /// Start over from any phase
    pub fn restart(&mut self, now: f64) {
        self.start(now);
    }

    /// Stop every timer, settle the high score and enter GameOver.
    /// Returns `None` if no session was running.
    pub fn end(&mut self, now: f64) -> Option<SessionSummary> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        self.scheduler.clear();
        self.pending_chain = 0;
        self.last_frame_at = None;
        self.state.phase = GamePhase::GameOver;

        let score = self.state.score;
        let new_record = self.high_score.record(score);
        if new_record {
            self.state.high_score = self.high_score.best;
            if let Err(e) = self.high_score.save(&mut self.storage) {
                log::warn!("Failed to save high score: {e}");
            }
        }

        let summary = SessionSummary {
            score,
            max_combo: self.state.combo.max_streak(),
            high_score: self.high_score.best,
            new_record,
        };
        log::info!(
            "Session {} over: score {}, max combo {}",
            self.sessions_started,
            score,
            summary.max_combo
        );
        self.state
            .events
            .push(GameEvent::GameOver { score, new_record });
        self.push_hud(now);
        self.hud.game_over(&summary);
        self.last_summary = Some(summary);
        Some(summary)
    }

    /// Handle a pointer press in canvas-local coordinates
    pub fn pointer_down(&mut self, point: Option<Vec2>, now: f64) -> HitOutcome {
        if self.state.phase != GamePhase::Playing {
            return HitOutcome::Ignored;
        }
        let Some(point) = point.filter(|p| p.is_finite()) else {
            log::debug!("Ignoring pointer event without usable coordinates");
            return HitOutcome::Ignored;
        };

        // Bring timers up to date so the press sees the current entities
        let mark = self.state.messages.len();
        self.run_due(now);
        if self.state.phase != GamePhase::Playing {
            return HitOutcome::Ignored;
        }

        let outcome = sim::resolve_pointer(&mut self.state, &self.tuning, point, now);
        match outcome {
            HitOutcome::PowerUp { id, kind } => {
                log::debug!("Collected {kind:?}");
                self.scheduler
                    .after(now, HIT_REMOVAL_DELAY_MS, Job::RemovePowerUp(id));
                self.sync_countdown_speed(now);
            }
            HitOutcome::Target { id, .. } => {
                self.scheduler
                    .after(now, HIT_REMOVAL_DELAY_MS, Job::RemoveTarget(id));
                self.scheduler.cancel_job(&Job::ComboDecay);
                self.scheduler
                    .after(now, self.tuning.combo_timeout_ms, Job::ComboDecay);
            }
            HitOutcome::Miss => {
                self.scheduler.cancel_job(&Job::ComboDecay);
            }
            HitOutcome::Ignored => {}
        }

        self.forward_messages(mark);
        if self.state.lives <= 0 {
            self.end(now);
        } else {
            self.push_hud(now);
        }
        outcome
    }

    /// Run due timers and the simulation update. Returns whether the frame
    /// loop should keep going.
    pub fn step(&mut self, now: f64) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        let dt = self
            .last_frame_at
            .map_or(FRAME_MS, |last| (now - last).max(0.0));
        self.last_frame_at = Some(now);

        let mark = self.state.messages.len();
        self.run_due(now);
        self.forward_messages(mark);
        if self.state.phase != GamePhase::Playing {
            return false;
        }

        sim::update(&mut self.state, now, dt);
        if self.state.is_exhausted() {
            self.end(now);
            return false;
        }
        self.sync_countdown_speed(now);
        self.push_hud(now);
        true
    }

    /// One animation frame: timers, update, then render. Returns whether the
    /// host should request another frame.
    pub fn frame(&mut self, now: f64, surface: &mut impl Surface) -> bool {
        let keep_going = self.step(now);
        renderer::render(&self.state, &self.settings, now, surface);
        keep_going
    }

    fn run_due(&mut self, now: f64) {
        while let Some(job) = self.scheduler.pop_due(now) {
            self.run_job(job, now);
            if self.state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    fn run_job(&mut self, job: Job, now: f64) {
        match job {
            Job::Countdown => {
                sim::countdown_tick(&mut self.state, &self.tuning);
                if self.state.time_remaining <= 0 {
                    self.end(now);
                }
            }
            Job::SpawnTarget => self.spawn_target(now),
            Job::SpawnPowerUp => self.spawn_power_up(now),
            Job::ChainSpawn => {
                self.pending_chain = self.pending_chain.saturating_sub(1);
                self.spawn_target(now);
            }
            Job::RemoveTarget(id) => {
                self.state.remove_target(id);
            }
            Job::RemovePowerUp(id) => {
                self.state.remove_power_up(id);
            }
            Job::ComboDecay => {
                if self.state.combo.decay(now) {
                    self.state.events.push(GameEvent::ComboDecayed);
                }
            }
        }
    }

    fn spawn_target(&mut self, now: f64) {
        let id = self.state.next_entity_id();
        let (difficulty, bounds) = (self.state.difficulty, self.state.bounds);
        let spawned = sim::spawn_target(
            &mut self.state.rng,
            &self.tuning,
            difficulty,
            bounds,
            id,
            now,
        );
        let kind = spawned.target.kind;
        log::debug!("Spawned {kind:?} target {id}");
        self.state.targets.push(spawned.target);
        self.state.events.push(GameEvent::TargetSpawned { id, kind });

        if spawned.chain {
            if self.pending_chain < self.tuning.max_pending_chain_spawns {
                self.pending_chain += 1;
                self.scheduler
                    .after(now, CHAIN_SPAWN_DELAY_MS, Job::ChainSpawn);
            } else {
                log::debug!("Chain spawn dropped, {} already pending", self.pending_chain);
            }
        }
    }

    fn spawn_power_up(&mut self, now: f64) {
        let live = self.state.live_power_ups();
        let id = self.state.next_entity_id();
        let bounds = self.state.bounds;
        if let Some(power_up) =
            sim::spawn_power_up(&mut self.state.rng, &self.tuning, bounds, live, id, now)
        {
            let kind = power_up.kind;
            log::debug!("Spawned {kind:?} power-up {id}");
            self.state.power_ups.push(power_up);
            self.state.events.push(GameEvent::PowerUpSpawned { id, kind });
        }
    }

    /// Match the countdown interval to the Slow Time effect
    fn sync_countdown_speed(&mut self, now: f64) {
        let wanted = if self.state.effects.is_active(EffectKind::SlowTime, now) {
            self.tuning.slow_countdown_interval_ms
        } else {
            self.tuning.countdown_interval_ms
        };
        if let Some(current) = self.scheduler.period_of(&Job::Countdown)
            && current != wanted
        {
            self.scheduler.set_period(&Job::Countdown, now, wanted);
        }
    }

    fn forward_messages(&mut self, from: usize) {
        if let Some(new) = self.state.messages.get(from..) {
            for message in new {
                self.hud.announce(message);
            }
        }
    }

    fn push_hud(&mut self, now: f64) {
        let snapshot = HudSnapshot::from_state(&self.state, now);
        self.hud.update(&snapshot);
    }

    pub fn hud_snapshot(&self, now: f64) -> HudSnapshot {
        HudSnapshot::from_state(&self.state, now)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Canvas resized
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.state.bounds = bounds;
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_playing(&self) -> bool {
        self.state.phase == GamePhase::Playing
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Direct state access (tests, debug tooling)
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn scheduler(&self) -> &Scheduler<Job> {
        &self.scheduler
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best
    }

    pub fn last_summary(&self) -> Option<SessionSummary> {
        self.last_summary
    }

    pub fn pending_chain_spawns(&self) -> u32 {
        self.pending_chain
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut H {
        &mut self.hud
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::LogHud;
    use crate::persistence::MemoryStorage;
    use crate::sim::PowerUpKind;

    fn session() -> Session<LogHud, MemoryStorage> {
        Session::new(
            Tuning::default(),
            LogHud::new(),
            MemoryStorage::new(),
            42,
            Bounds::default(),
        )
    }

    #[test]
    fn test_start_arms_drivers() {
        let mut s = session();
        assert_eq!(s.phase(), GamePhase::Intro);
        s.start(0.0);
        assert!(s.is_playing());
        assert!(s.scheduler().is_scheduled(&Job::Countdown));
        assert!(s.scheduler().is_scheduled(&Job::SpawnTarget));
        assert!(s.scheduler().is_scheduled(&Job::SpawnPowerUp));
        // One immediate spawn
        assert_eq!(s.state().targets.len(), 1);
        assert_eq!(s.state().time_remaining, 60);
        assert_eq!(s.state().lives, 3);
    }

    #[test]
    fn test_countdown_and_spawns_run_from_frames() {
        let mut s = session();
        s.start(0.0);
        // Keep lives from running out while targets expire
        s.state_mut().lives = 1000;
        let mut now = 0.0;
        while now < 5000.0 {
            now += FRAME_MS;
            assert!(s.step(now));
        }
        assert_eq!(s.state().time_remaining, 55);
        let spawned = s
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::TargetSpawned { .. }))
            .count();
        assert!(spawned >= 5, "only {spawned} spawns");
    }

    #[test]
    fn test_pointer_ignored_outside_play() {
        let mut s = session();
        assert_eq!(
            s.pointer_down(Some(Vec2::new(1.0, 1.0)), 0.0),
            HitOutcome::Ignored
        );
        s.start(0.0);
        assert_eq!(s.pointer_down(None, 10.0), HitOutcome::Ignored);
        assert_eq!(
            s.pointer_down(Some(Vec2::new(f32::INFINITY, 1.0)), 10.0),
            HitOutcome::Ignored
        );
        assert_eq!(s.state().lives, 3);
    }

    #[test]
    fn test_hit_schedules_removal() {
        let mut s = session();
        s.start(0.0);
        let target = s.state().targets[0].clone();
        let outcome = s.pointer_down(Some(target.pos), 50.0);
        assert!(matches!(outcome, HitOutcome::Target { id, .. } if id == target.id));
        assert!(s.scheduler().is_scheduled(&Job::RemoveTarget(target.id)));
        assert!(s.scheduler().is_scheduled(&Job::ComboDecay));
        s.step(149.0);
        assert!(s.state().targets.iter().any(|t| t.id == target.id));
        s.step(150.0);
        assert!(!s.state().targets.iter().any(|t| t.id == target.id));
    }

    #[test]
    fn test_combo_decays_on_timer() {
        let mut s = session();
        s.start(0.0);
        let pos = s.state().targets[0].pos;
        s.pointer_down(Some(pos), 10.0);
        assert_eq!(s.state().combo.streak(), 1);
        s.state_mut().lives = 1000;
        s.step(2009.0);
        assert_eq!(s.state().combo.streak(), 1);
        s.step(2010.0);
        assert_eq!(s.state().combo.streak(), 0);
        assert!(s.drain_events().contains(&GameEvent::ComboDecayed));
    }

    #[test]
    fn test_slow_time_stretches_countdown() {
        let mut s = session();
        s.start(0.0);
        s.state_mut().lives = 1000;
        sim::apply_power_up(s.state_mut(), &Tuning::default(), PowerUpKind::SlowTime, 100.0);
        s.step(100.0);
        assert_eq!(s.scheduler().period_of(&Job::Countdown), Some(1500.0));
        s.step(1599.0);
        assert_eq!(s.state().time_remaining, 60);
        s.step(1600.0);
        assert_eq!(s.state().time_remaining, 59);

        // Effect ends at 10_100; the normal pace resumes
        s.step(10_100.0);
        assert_eq!(s.scheduler().period_of(&Job::Countdown), Some(1000.0));
    }

    #[test]
    fn test_end_clears_everything() {
        let mut s = session();
        s.start(0.0);
        s.state_mut().score = 300;
        let summary = s.end(500.0).unwrap();
        assert!(summary.new_record);
        assert_eq!(summary.high_score, 300);
        assert!(s.scheduler().is_empty());
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert!(!s.step(10_000.0));
        assert_eq!(s.end(600.0), None);
        assert_eq!(HighScore::load(s.storage()).best, 300);
    }

    #[test]
    fn test_time_out_ends_session() {
        let mut s = session();
        s.start(0.0);
        s.state_mut().lives = 10_000;
        s.state_mut().time_remaining = 2;
        assert!(s.step(1000.0));
        assert!(!s.step(2000.0));
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert!(s.last_summary().is_some());
    }

    #[test]
    fn test_chain_queue_is_capped() {
        let mut tuning = Tuning::default();
        tuning.chain_spawn_chance_per_level = 1.0;
        tuning.max_pending_chain_spawns = 2;
        let mut s = Session::new(tuning, LogHud::new(), MemoryStorage::new(), 7, Bounds::default());
        s.start(0.0);
        assert_eq!(s.pending_chain_spawns(), 1);
        s.run_job(Job::SpawnTarget, 10.0);
        s.run_job(Job::SpawnTarget, 20.0);
        assert_eq!(s.pending_chain_spawns(), 2);
        s.step(300.0);
        assert!(s.pending_chain_spawns() <= 2);
    }
}
