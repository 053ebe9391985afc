//! Hit-streak tracking
//!
//! A streak grows while hits land within the combo timeout of each other.
//! The multiplier is derived from the streak; it is never stored.

use crate::tuning::Tuning;

/// Result of registering a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboHit {
    pub streak: u32,
    pub multiplier: u32,
    /// Set only on the hit that crosses into a higher tier
    pub tier_reached: Option<u32>,
}

/// Streak, multiplier tier and decay deadline
#[derive(Debug, Clone, PartialEq)]
pub struct ComboTracker {
    streak: u32,
    max_streak: u32,
    last_hit_at: Option<f64>,
    decay_at: Option<f64>,
    timeout_ms: f64,
    tier2: u32,
    tier3: u32,
}

impl ComboTracker {
    pub fn new(timeout_ms: f64, tier2: u32, tier3: u32) -> Self {
        Self {
            streak: 0,
            max_streak: 0,
            last_hit_at: None,
            decay_at: None,
            timeout_ms,
            tier2,
            tier3,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(
            tuning.combo_timeout_ms,
            tuning.combo_tier2_streak,
            tuning.combo_tier3_streak,
        )
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    /// Deadline after which the streak decays, if a hit is pending
    pub fn decay_at(&self) -> Option<f64> {
        self.decay_at
    }

    pub fn multiplier(&self) -> u32 {
        multiplier_for(self.streak, self.tier2, self.tier3)
    }

    /// Register a qualifying hit
    pub fn on_hit(&mut self, now: f64) -> ComboHit {
        let before = self.multiplier();
        let within_window = self
            .last_hit_at
            .is_some_and(|last| now - last < self.timeout_ms);

        self.streak = if within_window { self.streak + 1 } else { 1 };
        self.max_streak = self.max_streak.max(self.streak);
        self.last_hit_at = Some(now);
        self.decay_at = Some(now + self.timeout_ms);

        let multiplier = self.multiplier();
        ComboHit {
            streak: self.streak,
            multiplier,
            tier_reached: (multiplier > before).then_some(multiplier),
        }
    }

    /// Break the streak immediately
    pub fn on_miss(&mut self) {
        self.streak = 0;
        self.decay_at = None;
    }

    /// Drop the streak if its decay deadline has passed. Returns true if it did.
    pub fn decay(&mut self, now: f64) -> bool {
        match self.decay_at {
            Some(at) if now >= at => {
                self.decay_at = None;
                let had_streak = self.streak > 0;
                self.streak = 0;
                had_streak
            }
            _ => false,
        }
    }
}

/// Multiplier tier for a streak length
pub fn multiplier_for(streak: u32, tier2: u32, tier3: u32) -> u32 {
    if streak >= tier3 {
        3
    } else if streak >= tier2 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker() -> ComboTracker {
        ComboTracker::from_tuning(&Tuning::default())
    }

    #[test]
    fn test_streak_grows_within_window() {
        let mut combo = tracker();
        for i in 0..4 {
            let hit = combo.on_hit(i as f64 * 500.0);
            assert_eq!(hit.streak, i + 1);
            assert_eq!(hit.multiplier, 1);
            assert_eq!(hit.tier_reached, None);
        }
        let hit = combo.on_hit(2000.0);
        assert_eq!(hit.streak, 5);
        assert_eq!(hit.multiplier, 2);
        assert_eq!(hit.tier_reached, Some(2));

        // Staying in the tier does not notify again
        let hit = combo.on_hit(2100.0);
        assert_eq!(hit.multiplier, 2);
        assert_eq!(hit.tier_reached, None);
    }

    #[test]
    fn test_tier_three() {
        let mut combo = tracker();
        let mut notifications = Vec::new();
        for i in 0..12 {
            if let Some(tier) = combo.on_hit(i as f64 * 100.0).tier_reached {
                notifications.push(tier);
            }
        }
        assert_eq!(notifications, vec![2, 3]);
        assert_eq!(combo.multiplier(), 3);
        assert_eq!(combo.max_streak(), 12);
    }

    #[test]
    fn test_slow_hit_restarts_at_one() {
        let mut combo = tracker();
        combo.on_hit(0.0);
        combo.on_hit(1000.0);
        assert_eq!(combo.on_hit(3000.0).streak, 1);
    }

    #[test]
    fn test_miss_resets() {
        let mut combo = tracker();
        for i in 0..6 {
            combo.on_hit(i as f64 * 100.0);
        }
        assert_eq!(combo.multiplier(), 2);
        combo.on_miss();
        assert_eq!(combo.streak(), 0);
        assert_eq!(combo.multiplier(), 1);
        assert_eq!(combo.decay_at(), None);
        assert_eq!(combo.max_streak(), 6);
    }

    #[test]
    fn test_decay() {
        let mut combo = tracker();
        combo.on_hit(0.0);
        combo.on_hit(500.0);
        assert!(!combo.decay(2499.0));
        assert_eq!(combo.streak(), 2);
        assert!(combo.decay(2500.0));
        assert_eq!(combo.streak(), 0);
        assert_eq!(combo.multiplier(), 1);
        // Nothing left to decay
        assert!(!combo.decay(10_000.0));
        // A fresh hit after decay starts at 1
        assert_eq!(combo.on_hit(2600.0).streak, 1);
    }

    proptest! {
        #[test]
        fn prop_multiplier_monotonic_in_streak(gaps in prop::collection::vec(0.0f64..1999.0, 1..40)) {
            let mut combo = tracker();
            let mut now = 0.0;
            let mut last_multiplier = 1;
            for gap in gaps {
                now += gap;
                let hit = combo.on_hit(now);
                prop_assert!(hit.multiplier >= last_multiplier);
                prop_assert!((1..=3).contains(&hit.multiplier));
                last_multiplier = hit.multiplier;
            }
        }

        #[test]
        fn prop_multiplier_resets_on_miss(hits in 1u32..30) {
            let mut combo = tracker();
            for i in 0..hits {
                combo.on_hit(i as f64 * 10.0);
            }
            combo.on_miss();
            prop_assert_eq!(combo.multiplier(), 1);
            prop_assert_eq!(combo.streak(), 0);
        }
    }
}
