//! Pointer hit resolution and scoring
//!
//! A pointer press affects at most one entity. Power-ups are tested first,
//! newest to oldest, then targets the same way, so the entity drawn on top
//! wins overlapping hits. Entities are only marked here; removal is the
//! caller's job.

use glam::Vec2;

use super::combo::ComboHit;
use super::state::{EffectKind, GameEvent, Popup, PowerUpKind, SessionState, TargetKind};
use crate::rgb_hex;
use crate::tuning::Tuning;

/// What a pointer press did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Collected a power-up (targets were not checked)
    PowerUp { id: u32, kind: PowerUpKind },
    /// Hit a target
    Target {
        id: u32,
        kind: TargetKind,
        points: u64,
        combo: ComboHit,
    },
    /// Nothing under the pointer; a life was lost
    Miss,
    /// Press discarded (bad coordinates or no session running)
    Ignored,
}

/// Reaction-speed factor: 1 at spawn, 0 at expiry, floored at -0.5
pub fn time_factor(elapsed: f64, lifetime: f64) -> f64 {
    if lifetime <= 0.0 {
        return 0.0;
    }
    (1.0 - elapsed / lifetime).clamp(-0.5, 1.0)
}

/// Points for a hit: base × (timeFactor + 0.5) × multiplier, rounded up, doubled under Double Points
pub fn score_for(base_points: f64, time_factor: f64, multiplier: u32, doubled: bool) -> u64 {
    let earned = (base_points * (time_factor + 0.5) * multiplier as f64).ceil();
    let earned = if earned.is_finite() { earned.max(0.0) as u64 } else { 0 };
    if doubled { earned * 2 } else { earned }
}

/// Apply a collected power-up to the session
pub fn apply_power_up(state: &mut SessionState, tuning: &Tuning, kind: PowerUpKind, now: f64) {
    match kind {
        PowerUpKind::ExtraLife => state.lives += 1,
        PowerUpKind::TimeBoost => state.time_remaining += tuning.time_boost_secs,
        PowerUpKind::SlowTime | PowerUpKind::DoublePoints => {
            if let Some(effect) = kind.effect() {
                state.effects.activate(effect, now, tuning.effect_duration_ms);
            }
        }
    }
    state.announce(kind.announcement(), kind.color(), now);
    state.events.push(GameEvent::PowerUpCollected { kind });
}

/// Resolve a pointer press at `point` (canvas-local pixels)
pub fn resolve_pointer(
    state: &mut SessionState,
    tuning: &Tuning,
    point: Vec2,
    now: f64,
) -> HitOutcome {
    if !point.is_finite() {
        return HitOutcome::Ignored;
    }

    if let Some(power_up) = state
        .power_ups
        .iter_mut()
        .rev()
        .find(|p| !p.is_hit() && p.contains(point))
    {
        power_up.hit_at = Some(now);
        let (id, kind) = (power_up.id, power_up.kind);
        apply_power_up(state, tuning, kind, now);
        return HitOutcome::PowerUp { id, kind };
    }

    let doubled = state.effects.is_active(EffectKind::DoublePoints, now);
    if let Some(target) = state
        .targets
        .iter_mut()
        .rev()
        .find(|t| !t.is_hit() && t.contains(point, now))
    {
        target.hit_at = Some(now);
        let (id, kind, pos) = (target.id, target.kind, target.pos);
        let factor = time_factor(target.elapsed(now), target.lifetime);
        let base = target.points;

        let combo = state.combo.on_hit(now);
        let points = score_for(base, factor, combo.multiplier, doubled);
        state.score += points;

        state.popups.push(Popup {
            pos,
            text: format!("+{points}"),
            born_at: now,
        });
        if let Some(multiplier) = combo.tier_reached {
            state.announce(format!("Combo x{multiplier}!"), rgb_hex(0xFFAB40), now);
            state.events.push(GameEvent::ComboTier { multiplier });
        }
        state.events.push(GameEvent::TargetHit {
            id,
            kind,
            points,
            multiplier: combo.multiplier,
        });
        return HitOutcome::Target {
            id,
            kind,
            points,
            combo,
        };
    }

    state.lives -= 1;
    state.combo.on_miss();
    state.events.push(GameEvent::Missed);
    HitOutcome::Miss
}
