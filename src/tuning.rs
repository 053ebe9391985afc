//! Data-driven game balance
//!
//! Every gameplay number lives here so a JSON blob can rebalance the game
//! without touching code. Missing fields keep their defaults.

use serde::{Deserialize, Serialize};

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session ===
    /// Countdown length (seconds)
    pub session_seconds: i32,
    /// Lives at session start
    pub starting_lives: i32,
    /// Difficulty at session start
    pub starting_difficulty: f32,
    /// Difficulty added at each ramp boundary
    pub difficulty_step: f32,
    /// Ramp boundary, in seconds of countdown
    pub difficulty_interval_secs: i32,

    // === Targets ===
    pub target_min_radius: f32,
    pub target_max_radius: f32,
    /// Radius lost per difficulty level
    pub radius_shrink_per_level: f32,
    pub target_min_lifetime_ms: f64,
    pub target_max_lifetime_ms: f64,
    /// Lifetime lost per difficulty level
    pub lifetime_shrink_per_level_ms: f64,
    /// Difficulty at which Moving/Shrinking/Bonus targets start appearing
    pub special_kinds_min_difficulty: f32,
    /// Bonus targets live this fraction of a normal lifetime
    pub bonus_lifetime_factor: f64,
    /// Moving target speed (px per frame) per difficulty level
    pub move_speed_per_level: f32,
    /// Fraction of its radius a Shrinking target loses over its lifetime
    pub shrink_rate: f32,

    // === Chained spawns ===
    /// Chance of a chained extra spawn, per difficulty level
    pub chain_spawn_chance_per_level: f64,
    /// Maximum chained spawns waiting at once
    pub max_pending_chain_spawns: u32,

    // === Drivers ===
    pub countdown_interval_ms: f64,
    /// Countdown interval while Slow Time is active
    pub slow_countdown_interval_ms: f64,
    pub target_spawn_interval_ms: f64,
    pub power_up_spawn_interval_ms: f64,

    // === Combo ===
    /// Max gap between hits that keeps a streak alive
    pub combo_timeout_ms: f64,
    /// Streak that unlocks the x2 multiplier
    pub combo_tier2_streak: u32,
    /// Streak that unlocks the x3 multiplier
    pub combo_tier3_streak: u32,

    // === Power-ups ===
    pub power_up_radius: f32,
    pub power_up_lifetime_ms: f64,
    pub max_live_power_ups: usize,
    /// Chance an Extra Life roll is thrown away
    pub extra_life_reject_chance: f64,
    /// Slow Time / Double Points window
    pub effect_duration_ms: f64,
    /// Seconds granted by Time Boost
    pub time_boost_secs: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            session_seconds: 60,
            starting_lives: 3,
            starting_difficulty: 1.0,
            difficulty_step: 0.5,
            difficulty_interval_secs: 10,

            target_min_radius: 20.0,
            target_max_radius: 50.0,
            radius_shrink_per_level: 3.0,
            target_min_lifetime_ms: 1000.0,
            target_max_lifetime_ms: 3000.0,
            lifetime_shrink_per_level_ms: 200.0,
            special_kinds_min_difficulty: 2.0,
            bonus_lifetime_factor: 0.6,
            move_speed_per_level: 1.0,
            shrink_rate: 0.7,

            chain_spawn_chance_per_level: 0.1,
            max_pending_chain_spawns: 3,

            countdown_interval_ms: 1000.0,
            slow_countdown_interval_ms: 1500.0,
            target_spawn_interval_ms: 1000.0,
            power_up_spawn_interval_ms: 10_000.0,

            combo_timeout_ms: 2000.0,
            combo_tier2_streak: 5,
            combo_tier3_streak: 10,

            power_up_radius: 30.0,
            power_up_lifetime_ms: 5000.0,
            max_live_power_ups: 2,
            extra_life_reject_chance: 0.7,
            effect_duration_ms: 10_000.0,
            time_boost_secs: 10,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON, keeping defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Base radius for a difficulty level
    pub fn radius_for(&self, difficulty: f32) -> f32 {
        (self.target_max_radius - self.radius_shrink_per_level * difficulty)
            .max(self.target_min_radius)
            .min(self.target_max_radius)
    }

    /// Base lifetime (ms) for a difficulty level
    pub fn lifetime_for(&self, difficulty: f32) -> f64 {
        (self.target_max_lifetime_ms - self.lifetime_shrink_per_level_ms * difficulty as f64)
            .max(self.target_min_lifetime_ms)
            .min(self.target_max_lifetime_ms)
    }
}
