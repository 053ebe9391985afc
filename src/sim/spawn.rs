//! Target and power-up factory
//!
//! Pure constructors: the caller supplies the RNG, the entity ID and the
//! clock, and decides what to do with the chained-spawn request.

use glam::Vec2;
use rand::Rng;

use super::state::{
    BONUS_COLOR, Bounds, PowerUp, PowerUpKind, TARGET_COLORS, Target, TargetKind,
};
use crate::tuning::Tuning;

/// A freshly built target plus its side effect
#[derive(Debug, Clone)]
pub struct SpawnedTarget {
    pub target: Target,
    /// Another target should follow shortly
    pub chain: bool,
}

/// Pick a target kind. Special kinds stay locked below the unlock difficulty.
pub fn roll_target_kind<R: Rng>(rng: &mut R, tuning: &Tuning, difficulty: f32) -> TargetKind {
    if difficulty < tuning.special_kinds_min_difficulty {
        return TargetKind::Normal;
    }
    let roll: f32 = rng.random();
    if roll < 0.1 {
        TargetKind::Bonus
    } else if roll < 0.3 {
        TargetKind::Moving
    } else if roll < 0.5 {
        TargetKind::Shrinking
    } else {
        TargetKind::Normal
    }
}

/// Base point value: bigger reward for smaller targets and higher difficulty
pub fn base_points(tuning: &Tuning, difficulty: f32, radius: f32, kind: TargetKind) -> f64 {
    let bonus = if kind == TargetKind::Bonus { 30.0 } else { 10.0 };
    let level = difficulty.ceil().max(0.0) as f64;
    (level * (tuning.target_max_radius - radius + bonus) as f64).max(0.0)
}

/// Build a target scaled to the current difficulty
pub fn spawn_target<R: Rng>(
    rng: &mut R,
    tuning: &Tuning,
    difficulty: f32,
    bounds: Bounds,
    id: u32,
    now: f64,
) -> SpawnedTarget {
    let radius = tuning.radius_for(difficulty);
    let mut lifetime = tuning.lifetime_for(difficulty);
    let pos = bounds.random_inset(rng, radius);
    let kind = roll_target_kind(rng, tuning, difficulty);

    let mut color = TARGET_COLORS[rng.random_range(0..TARGET_COLORS.len())];
    let mut vel = Vec2::ZERO;
    match kind {
        TargetKind::Bonus => {
            lifetime = (lifetime * tuning.bonus_lifetime_factor).max(tuning.target_min_lifetime_ms);
            color = BONUS_COLOR;
        }
        TargetKind::Moving => {
            let speed = tuning.move_speed_per_level * difficulty;
            vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 2.0 * speed,
                (rng.random::<f32>() - 0.5) * 2.0 * speed,
            );
        }
        TargetKind::Normal | TargetKind::Shrinking => {}
    }

    let chance = (tuning.chain_spawn_chance_per_level * difficulty as f64).clamp(0.0, 1.0);
    let chain = rng.random_bool(chance);

    SpawnedTarget {
        target: Target {
            id,
            kind,
            pos,
            radius,
            color,
            created_at: now,
            lifetime,
            hit_at: None,
            points: base_points(tuning, difficulty, radius, kind),
            vel,
            shrink_rate: if kind == TargetKind::Shrinking {
                tuning.shrink_rate
            } else {
                0.0
            },
        },
        chain,
    }
}

/// Build a power-up, or nothing if the field is full or the Extra Life roll is rejected
pub fn spawn_power_up<R: Rng>(
    rng: &mut R,
    tuning: &Tuning,
    bounds: Bounds,
    live_count: usize,
    id: u32,
    now: f64,
) -> Option<PowerUp> {
    if live_count >= tuning.max_live_power_ups {
        return None;
    }
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    if kind == PowerUpKind::ExtraLife
        && rng.random_bool(tuning.extra_life_reject_chance.clamp(0.0, 1.0))
    {
        return None;
    }
    let radius = tuning.power_up_radius;
    Some(PowerUp {
        id,
        kind,
        pos: bounds.random_inset(rng, radius),
        radius,
        created_at: now,
        lifetime: tuning.power_up_lifetime_ms,
        hit_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_low_difficulty_is_always_normal() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            assert_eq!(roll_target_kind(&mut rng, &tuning, 1.5), TargetKind::Normal);
        }
    }

    #[test]
    fn test_special_kinds_unlock() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let kinds: Vec<_> = (0..500)
            .map(|_| roll_target_kind(&mut rng, &tuning, 2.0))
            .collect();
        for kind in [
            TargetKind::Normal,
            TargetKind::Moving,
            TargetKind::Shrinking,
            TargetKind::Bonus,
        ] {
            assert!(kinds.contains(&kind), "{kind:?} never rolled");
        }
    }

    #[test]
    fn test_base_points() {
        let tuning = Tuning::default();
        // difficulty 1: radius 47 -> 1 * (50 - 47 + 10)
        assert_eq!(base_points(&tuning, 1.0, 47.0, TargetKind::Normal), 13.0);
        // difficulty 2.5 rounds up to 3
        assert_eq!(base_points(&tuning, 2.5, 42.5, TargetKind::Normal), 52.5);
        assert_eq!(base_points(&tuning, 2.5, 42.5, TargetKind::Bonus), 112.5);
    }

    #[test]
    fn test_bonus_targets() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let bonus = (0..500)
            .map(|i| spawn_target(&mut rng, &tuning, 3.0, Bounds::default(), i, 0.0).target)
            .find(|t| t.kind == TargetKind::Bonus)
            .expect("no bonus target in 500 spawns");
        assert_eq!(bonus.color, BONUS_COLOR);
        assert_eq!(bonus.lifetime, tuning.lifetime_for(3.0) * 0.6);
        assert!(bonus.lifetime >= tuning.target_min_lifetime_ms);
    }

    #[test]
    fn test_moving_targets_have_velocity() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let moving: Vec<_> = (0..300)
            .map(|i| spawn_target(&mut rng, &tuning, 4.0, Bounds::default(), i, 0.0).target)
            .filter(|t| t.kind == TargetKind::Moving)
            .collect();
        assert!(!moving.is_empty());
        for t in &moving {
            assert!(t.vel.x.abs() <= 4.0 && t.vel.y.abs() <= 4.0);
        }
        assert!(moving.iter().any(|t| t.vel != Vec2::ZERO));
    }

    #[test]
    fn test_chain_probability_scales() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let none = (0..200)
            .filter(|&i| spawn_target(&mut rng, &tuning, 0.0, Bounds::default(), i, 0.0).chain)
            .count();
        assert_eq!(none, 0);
        let always = (0..200)
            .filter(|&i| spawn_target(&mut rng, &tuning, 10.0, Bounds::default(), i, 0.0).chain)
            .count();
        assert_eq!(always, 200);
    }

    #[test]
    fn test_power_up_cap() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(6);
        for i in 0..100 {
            assert!(spawn_power_up(&mut rng, &tuning, Bounds::default(), 2, i, 0.0).is_none());
        }
    }

    #[test]
    fn test_extra_life_is_rare() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let spawned: Vec<_> = (0..4000)
            .filter_map(|i| spawn_power_up(&mut rng, &tuning, Bounds::default(), 0, i, 0.0))
            .collect();
        let extra = spawned
            .iter()
            .filter(|p| p.kind == PowerUpKind::ExtraLife)
            .count();
        let boosts = spawned
            .iter()
            .filter(|p| p.kind == PowerUpKind::TimeBoost)
            .count();
        assert!(extra > 0);
        assert!(extra * 2 < boosts, "extra={extra} boosts={boosts}");
        for p in &spawned {
            assert_eq!(p.radius, 30.0);
            assert_eq!(p.lifetime, 5000.0);
        }
    }

    proptest! {
        #[test]
        fn prop_target_within_limits(difficulty in 0.0f32..40.0, seed in any::<u64>(),
                                     w in 100.0f32..2000.0, h in 100.0f32..2000.0) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let bounds = Bounds::new(w, h);
            let t = spawn_target(&mut rng, &tuning, difficulty, bounds, 1, 0.0).target;
            prop_assert!(t.radius >= tuning.target_min_radius && t.radius <= tuning.target_max_radius);
            prop_assert!(t.lifetime >= tuning.target_min_lifetime_ms && t.lifetime <= tuning.target_max_lifetime_ms);
            prop_assert!(t.pos.x >= t.radius && t.pos.x <= w - t.radius);
            prop_assert!(t.pos.y >= t.radius && t.pos.y <= h - t.radius);
        }

        #[test]
        fn prop_center_hit_is_reflexive(difficulty in 0.0f32..40.0, seed in any::<u64>(), age in 0.0f64..5000.0) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let t = spawn_target(&mut rng, &tuning, difficulty, Bounds::default(), 1, 0.0).target;
            prop_assert!(t.current_radius(age) > 0.0);
            prop_assert!(t.contains(t.pos, age));
        }
    }
}
