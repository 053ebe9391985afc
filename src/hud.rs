//! HUD projection
//!
//! The HUD is a pure projection of session state: the controller builds a
//! `HudSnapshot` and hands it to whatever `HudSink` the host provides (DOM
//! text nodes in the browser, the log natively, a recorder in tests).

use serde::{Deserialize, Serialize};

use crate::sim::state::{EffectBadge, EffectKind, Message, SessionState};

/// Everything the HUD displays
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    /// Never negative
    pub lives: u32,
    /// Seconds, never negative
    pub time_remaining: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub multiplier: u32,
    pub high_score: u64,
    pub difficulty: f32,
    /// Active timed effects, in display order
    pub badges: Vec<EffectBadge>,
}

impl HudSnapshot {
    pub fn from_state(state: &SessionState, now: f64) -> Self {
        Self {
            score: state.score,
            lives: state.display_lives(),
            time_remaining: state.display_time(),
            combo: state.combo.streak(),
            max_combo: state.combo.max_streak(),
            multiplier: state.combo.multiplier(),
            high_score: state.high_score.max(state.score),
            difficulty: state.difficulty,
            badges: state.effects.badges(now),
        }
    }

    /// Combo readout, e.g. "7 (x2)"
    pub fn combo_label(&self) -> String {
        if self.multiplier > 1 {
            format!("{} (x{})", self.combo, self.multiplier)
        } else {
            self.combo.to_string()
        }
    }
}

impl EffectBadge {
    /// Badge text, e.g. "2x Points: 7s"
    pub fn label(&self) -> String {
        let name = match self.kind {
            EffectKind::DoublePoints => "2x Points",
            EffectKind::SlowTime => "Slow Time",
        };
        format!("{name}: {}s", self.seconds_left)
    }
}

/// Final report of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub max_combo: u32,
    /// Best score after this session
    pub high_score: u64,
    pub new_record: bool,
}

/// Display sink supplied by the host
pub trait HudSink {
    /// Latest HUD values (called whenever something visible changed)
    fn update(&mut self, snapshot: &HudSnapshot);

    /// Transient announcement (power-up collected, combo tier)
    fn announce(&mut self, _message: &Message) {}

    /// Session ended
    fn game_over(&mut self, summary: &SessionSummary);
}

impl<H: HudSink + ?Sized> HudSink for &mut H {
    fn update(&mut self, snapshot: &HudSnapshot) {
        (**self).update(snapshot)
    }

    fn announce(&mut self, message: &Message) {
        (**self).announce(message)
    }

    fn game_over(&mut self, summary: &SessionSummary) {
        (**self).game_over(summary)
    }
}

/// HUD that writes to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogHud {
    last: Option<HudSnapshot>,
}

impl LogHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&HudSnapshot> {
        self.last.as_ref()
    }
}

impl HudSink for LogHud {
    fn update(&mut self, snapshot: &HudSnapshot) {
        if self.last.as_ref() != Some(snapshot) {
            log::debug!(
                "score={} lives={} time={} combo={}",
                snapshot.score,
                snapshot.lives,
                snapshot.time_remaining,
                snapshot.combo_label()
            );
            self.last = Some(snapshot.clone());
        }
    }

    fn announce(&mut self, message: &Message) {
        log::debug!("{}", message.text);
    }

    fn game_over(&mut self, summary: &SessionSummary) {
        log::info!(
            "Game over: score {} (best {}), max combo {}{}",
            summary.score,
            summary.high_score,
            summary.max_combo,
            if summary.new_record { ", new record!" } else { "" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Bounds;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_projection() {
        let tuning = Tuning::default();
        let mut state = SessionState::new(&tuning, 1, Bounds::default());
        state.lives = -1;
        state.score = 150;
        state.high_score = 100;
        state.effects.activate(EffectKind::DoublePoints, 0.0, 10_000.0);
        for i in 0..6 {
            state.combo.on_hit(i as f64 * 100.0);
        }

        let snap = HudSnapshot::from_state(&state, 2500.0);
        assert_eq!(snap.lives, 0);
        assert_eq!(snap.combo, 6);
        assert_eq!(snap.multiplier, 2);
        assert_eq!(snap.high_score, 150);
        assert_eq!(snap.badges.len(), 1);
        assert_eq!(snap.badges[0].label(), "2x Points: 8s");
        assert_eq!(snap.combo_label(), "6 (x2)");
    }

    #[test]
    fn test_log_hud_keeps_last() {
        let mut hud = LogHud::new();
        let snap = HudSnapshot {
            score: 10,
            ..Default::default()
        };
        hud.update(&snap);
        assert_eq!(hud.last(), Some(&snap));
    }
}
