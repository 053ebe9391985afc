//! Game-state simulation
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM,
//! the canvas or the wall clock:
//! - Time arrives as `now` / `dt` arguments
//! - Randomness comes from the session's seeded RNG
//! - Timers are data in a `Scheduler`, polled by the owner

pub mod combo;
pub mod hit;
pub mod scheduler;
pub mod spawn;
pub mod state;
pub mod tick;

pub use combo::{ComboHit, ComboTracker, multiplier_for};
pub use hit::{HitOutcome, apply_power_up, resolve_pointer, score_for, time_factor};
pub use scheduler::Scheduler;
pub use spawn::{SpawnedTarget, base_points, roll_target_kind, spawn_power_up, spawn_target};
pub use state::{
    ActiveEffects, BONUS_COLOR, Bounds, EffectBadge, EffectKind, GameEvent, GamePhase, Message,
    Popup, PowerUp, PowerUpKind, Rgba, SessionState, TARGET_COLORS, Target, TargetKind,
};
pub use tick::{countdown_tick, update};
