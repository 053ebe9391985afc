//! Per-frame simulation step and countdown tick
//!
//! `update` runs once per rendered frame with the real elapsed time;
//! `countdown_tick` runs from the once-a-second driver.

use glam::Vec2;

use super::state::{Bounds, GameEvent, SessionState, TargetKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Advance the session by one frame of `dt_ms` milliseconds
pub fn update(state: &mut SessionState, now: f64, dt_ms: f64) {
    let dt_ms = if dt_ms.is_finite() { dt_ms.clamp(0.0, MAX_FRAME_MS) } else { 0.0 };

    // Unhit targets that ran out cost a life; the streak survives
    let mut idx = 0;
    while idx < state.targets.len() {
        if state.targets[idx].is_expired(now) {
            let target = state.targets.remove(idx);
            state.lives -= 1;
            state.events.push(GameEvent::TargetExpired { id: target.id });
            if state.lives <= 0 {
                return;
            }
        } else {
            idx += 1;
        }
    }

    let steps = (dt_ms / FRAME_MS) as f32;
    let bounds = state.bounds;
    for target in state
        .targets
        .iter_mut()
        .filter(|t| t.kind == TargetKind::Moving && !t.is_hit())
    {
        target.pos += target.vel * steps;
        bounce(&mut target.pos, &mut target.vel, target.radius, bounds);
    }

    state.power_ups.retain(|p| !p.is_expired(now));

    for kind in state.effects.expire(now) {
        state.events.push(GameEvent::EffectExpired { kind });
    }

    state
        .popups
        .retain(|p| now - p.born_at < POPUP_LIFETIME_MS);
    state
        .messages
        .retain(|m| now - m.born_at < MESSAGE_LIFETIME_MS);
}

/// Reflect a circle off the canvas edges, keeping it fully inside
fn bounce(pos: &mut Vec2, vel: &mut Vec2, radius: f32, bounds: Bounds) {
    fn axis(p: &mut f32, v: &mut f32, radius: f32, extent: f32) {
        let (lo, hi) = (radius, extent - radius);
        if hi < lo {
            *p = extent / 2.0;
        } else if *p < lo {
            *p = lo;
            *v = v.abs();
        } else if *p > hi {
            *p = hi;
            *v = -v.abs();
        }
    }
    axis(&mut pos.x, &mut vel.x, radius, bounds.width);
    axis(&mut pos.y, &mut vel.y, radius, bounds.height);
}

/// One countdown second: decrement the clock and ramp difficulty on boundaries
pub fn countdown_tick(state: &mut SessionState, tuning: &Tuning) {
    state.time_remaining -= 1;
    let interval = tuning.difficulty_interval_secs;
    if interval > 0 && state.time_remaining > 0 && state.time_remaining % interval == 0 {
        state.difficulty += tuning.difficulty_step;
        log::debug!("Difficulty up: {:.1}", state.difficulty);
        state.events.push(GameEvent::DifficultyUp {
            level: state.difficulty,
        });
    }
}
