//! Game state and core simulation types
//!
//! Everything a session mutates lives in `SessionState`; the controller owns
//! one and hands it to the spawn/hit/tick functions.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboTracker;
use crate::consts::*;
use crate::rgb_hex;
use crate::tuning::Tuning;

/// Normalized RGBA color
pub type Rgba = [f32; 4];

/// Target palette (one picked at random per target)
pub const TARGET_COLORS: [Rgba; 15] = [
    rgb_hex(0xFF5252),
    rgb_hex(0xFF4081),
    rgb_hex(0x7C4DFF),
    rgb_hex(0x536DFE),
    rgb_hex(0x448AFF),
    rgb_hex(0x40C4FF),
    rgb_hex(0x18FFFF),
    rgb_hex(0x64FFDA),
    rgb_hex(0x69F0AE),
    rgb_hex(0xB2FF59),
    rgb_hex(0xEEFF41),
    rgb_hex(0xFFFF00),
    rgb_hex(0xFFD740),
    rgb_hex(0xFFAB40),
    rgb_hex(0xFF6E40),
];

/// Bonus targets are always gold
pub const BONUS_COLOR: Rgba = rgb_hex(0xFFD700);

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first start
    Intro,
    /// Active gameplay
    Playing,
    /// Session ended, waiting for restart
    GameOver,
}

/// Canvas bounds in canvas-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl Bounds {
    /// Build bounds, substituting the default for unusable dimensions
    pub fn new(width: f32, height: f32) -> Self {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        Self {
            width: if usable(width) { width } else { DEFAULT_CANVAS_WIDTH },
            height: if usable(height) { height } else { DEFAULT_CANVAS_HEIGHT },
        }
    }

    /// Uniform random position keeping a circle of `radius` fully inside
    pub fn random_inset<R: rand::Rng>(&self, rng: &mut R, radius: f32) -> Vec2 {
        let axis = |rng: &mut R, extent: f32| {
            let span = extent - radius * 2.0;
            if span <= 0.0 {
                extent / 2.0
            } else {
                radius + rng.random::<f32>() * span
            }
        };
        let x = axis(rng, self.width);
        let y = axis(rng, self.height);
        Vec2::new(x, y)
    }
}

/// Target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    Normal,
    /// Drifts and bounces off the canvas edges
    Moving,
    /// Shrinks harder than a normal target as it ages
    Shrinking,
    /// Short-lived, gold, worth extra
    Bonus,
}

/// A clickable target
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: u32,
    pub kind: TargetKind,
    pub pos: Vec2,
    /// Base radius (the rendered radius shrinks from this over the lifetime)
    pub radius: f32,
    pub color: Rgba,
    pub created_at: f64,
    pub lifetime: f64,
    /// Timestamp of the hit, if any
    pub hit_at: Option<f64>,
    /// Base point value before reaction and combo scaling
    pub points: f64,
    /// Velocity in px per 60 Hz frame (Moving only)
    pub vel: Vec2,
    /// Fraction of radius lost over the lifetime (Shrinking only)
    pub shrink_rate: f32,
}

impl Target {
    pub fn is_hit(&self) -> bool {
        self.hit_at.is_some()
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.created_at).max(0.0)
    }

    /// Remaining fraction of the lifetime, 1 at spawn and 0 at expiry
    pub fn remaining_fraction(&self, now: f64) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed(now) / self.lifetime).clamp(0.0, 1.0) as f32
    }

    /// Radius as currently drawn; hit-testing uses this, not the base radius
    pub fn current_radius(&self, now: f64) -> f32 {
        let remaining = self.remaining_fraction(now);
        let scale = match self.kind {
            TargetKind::Shrinking => 1.0 - self.shrink_rate * (1.0 - remaining),
            _ => 0.5 + remaining * 0.5,
        };
        self.radius * scale.max(MIN_RADIUS_FRACTION)
    }

    /// Unhit and past its lifetime
    pub fn is_expired(&self, now: f64) -> bool {
        !self.is_hit() && self.elapsed(now) >= self.lifetime
    }

    pub fn contains(&self, point: Vec2, now: f64) -> bool {
        point.distance(self.pos) <= self.current_radius(now)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    ExtraLife,
    TimeBoost,
    SlowTime,
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::ExtraLife,
        PowerUpKind::TimeBoost,
        PowerUpKind::SlowTime,
        PowerUpKind::DoublePoints,
    ];

    pub fn color(&self) -> Rgba {
        match self {
            PowerUpKind::ExtraLife => rgb_hex(0xFF5252),
            PowerUpKind::TimeBoost => rgb_hex(0x40C4FF),
            PowerUpKind::SlowTime => rgb_hex(0x7C4DFF),
            PowerUpKind::DoublePoints => rgb_hex(0xFFD740),
        }
    }

    /// Short icon label drawn on the power-up
    pub fn icon(&self) -> &'static str {
        match self {
            PowerUpKind::ExtraLife => "+1",
            PowerUpKind::TimeBoost => "+10s",
            PowerUpKind::SlowTime => "SLOW",
            PowerUpKind::DoublePoints => "x2",
        }
    }

    /// Announcement shown when collected
    pub fn announcement(&self) -> &'static str {
        match self {
            PowerUpKind::ExtraLife => "Extra Life!",
            PowerUpKind::TimeBoost => "+10 Seconds!",
            PowerUpKind::SlowTime => "Slow Time!",
            PowerUpKind::DoublePoints => "Double Points!",
        }
    }

    /// The timed effect this power-up starts, if any
    pub fn effect(&self) -> Option<EffectKind> {
        match self {
            PowerUpKind::SlowTime => Some(EffectKind::SlowTime),
            PowerUpKind::DoublePoints => Some(EffectKind::DoublePoints),
            PowerUpKind::ExtraLife | PowerUpKind::TimeBoost => None,
        }
    }
}

/// A clickable power-up
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub created_at: f64,
    pub lifetime: f64,
    pub hit_at: Option<f64>,
}

impl PowerUp {
    pub fn is_hit(&self) -> bool {
        self.hit_at.is_some()
    }

    pub fn is_expired(&self, now: f64) -> bool {
        !self.is_hit() && now - self.created_at >= self.lifetime
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.pos) <= self.radius
    }
}

/// Timed power-up effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    DoublePoints,
    SlowTime,
}

/// HUD badge for an active effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectBadge {
    pub kind: EffectKind,
    /// Whole seconds left, rounded up
    pub seconds_left: u32,
}

/// Active power-up effects: one slot per kind, so re-acquiring refreshes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveEffects {
    pub double_points_until: Option<f64>,
    pub slow_time_until: Option<f64>,
}

impl ActiveEffects {
    fn slot(&self, kind: EffectKind) -> Option<f64> {
        match kind {
            EffectKind::DoublePoints => self.double_points_until,
            EffectKind::SlowTime => self.slow_time_until,
        }
    }

    fn slot_mut(&mut self, kind: EffectKind) -> &mut Option<f64> {
        match kind {
            EffectKind::DoublePoints => &mut self.double_points_until,
            EffectKind::SlowTime => &mut self.slow_time_until,
        }
    }

    /// Start or refresh an effect window. Returns true if it was not already running.
    pub fn activate(&mut self, kind: EffectKind, now: f64, duration: f64) -> bool {
        let was_active = self.is_active(kind, now);
        *self.slot_mut(kind) = Some(now + duration);
        !was_active
    }

    pub fn is_active(&self, kind: EffectKind, now: f64) -> bool {
        self.slot(kind).is_some_and(|until| now < until)
    }

    pub fn ends_at(&self, kind: EffectKind) -> Option<f64> {
        self.slot(kind)
    }

    /// Clear every effect whose window has closed, returning the kinds cleared
    pub fn expire(&mut self, now: f64) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for kind in [EffectKind::DoublePoints, EffectKind::SlowTime] {
            let slot = self.slot_mut(kind);
            if slot.is_some_and(|until| now >= until) {
                *slot = None;
                expired.push(kind);
            }
        }
        expired
    }

    /// Declarative badge list for the HUD
    pub fn badges(&self, now: f64) -> Vec<EffectBadge> {
        [EffectKind::DoublePoints, EffectKind::SlowTime]
            .into_iter()
            .filter_map(|kind| {
                let until = self.slot(kind)?;
                (now < until).then(|| EffectBadge {
                    kind,
                    seconds_left: crate::ceil_secs(until - now),
                })
            })
            .collect()
    }
}

/// Floating "+N" text at a hit point
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub pos: Vec2,
    pub text: String,
    pub born_at: f64,
}

/// Transient on-screen announcement
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub color: Rgba,
    pub born_at: f64,
}

/// Things that happened, drained by the host for audio and logging
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted,
    TargetSpawned { id: u32, kind: TargetKind },
    TargetHit { id: u32, kind: TargetKind, points: u64, multiplier: u32 },
    TargetExpired { id: u32 },
    /// Pointer landed on nothing
    Missed,
    PowerUpSpawned { id: u32, kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    EffectExpired { kind: EffectKind },
    ComboTier { multiplier: u32 },
    ComboDecayed,
    DifficultyUp { level: f32 },
    GameOver { score: u64, new_record: bool },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: GamePhase,
    pub score: u64,
    /// Can dip below zero on the final miss; display through `display_lives`
    pub lives: i32,
    /// Seconds left on the countdown
    pub time_remaining: i32,
    pub difficulty: f32,
    /// Best score across sessions
    pub high_score: u64,
    pub bounds: Bounds,
    /// Targets in spawn order (last is topmost)
    pub targets: Vec<Target>,
    /// Power-ups in spawn order (last is topmost)
    pub power_ups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    pub combo: ComboTracker,
    pub popups: Vec<Popup>,
    pub messages: Vec<Message>,
    /// Pending events (drained by the session owner)
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl SessionState {
    /// Fresh state in the Intro phase
    pub fn new(tuning: &Tuning, seed: u64, bounds: Bounds) -> Self {
        Self {
            phase: GamePhase::Intro,
            score: 0,
            lives: tuning.starting_lives,
            time_remaining: tuning.session_seconds,
            difficulty: tuning.starting_difficulty,
            high_score: 0,
            bounds,
            targets: Vec::new(),
            power_ups: Vec::new(),
            effects: ActiveEffects::default(),
            combo: ComboTracker::from_tuning(tuning),
            popups: Vec::new(),
            messages: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Reset everything session-scoped, keeping the phase, bounds and high score
    pub fn reset(&mut self, tuning: &Tuning, seed: u64) {
        let phase = self.phase;
        let high_score = self.high_score;
        let bounds = self.bounds;
        *self = Self::new(tuning, seed, bounds);
        self.phase = phase;
        self.high_score = high_score;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Power-ups still waiting to be collected
    pub fn live_power_ups(&self) -> usize {
        self.power_ups.iter().filter(|p| !p.is_hit()).count()
    }

    pub fn remove_target(&mut self, id: u32) -> Option<Target> {
        let idx = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(idx))
    }

    pub fn remove_power_up(&mut self, id: u32) -> Option<PowerUp> {
        let idx = self.power_ups.iter().position(|p| p.id == id)?;
        Some(self.power_ups.remove(idx))
    }

    /// Lives as shown to the player (never negative)
    pub fn display_lives(&self) -> u32 {
        self.lives.max(0) as u32
    }

    /// Seconds as shown to the player (never negative)
    pub fn display_time(&self) -> u32 {
        self.time_remaining.max(0) as u32
    }

    /// Lives or time have run out
    pub fn is_exhausted(&self) -> bool {
        self.lives <= 0 || self.time_remaining <= 0
    }

    pub fn announce(&mut self, text: impl Into<String>, color: Rgba, now: f64) {
        self.messages.push(Message {
            text: text.into(),
            color,
            born_at: now,
        });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
