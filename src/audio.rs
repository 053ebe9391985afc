//! Sound effects
//!
//! Every effect is a short recipe of oscillator notes, synthesized with the
//! Web Audio API in the browser. No sample files needed. Natively the
//! recipes exist but nothing plays them.

use crate::sim::{GameEvent, TargetKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Session started
    Start,
    /// Target hit
    TargetHit,
    /// Bonus target hit
    BonusHit,
    /// Clicked empty space
    Miss,
    /// Target timed out
    Expire,
    /// Power-up collected
    PowerUp,
    /// Combo multiplier went up
    ComboTier,
    /// Game over
    GameOver,
    /// Game over with a new record
    HighScore,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
}

/// One oscillator note with an exponential gain decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f32,
    /// Glide target, if the pitch sweeps
    pub end_freq: Option<f32>,
    pub wave: Wave,
    /// Start offset (seconds)
    pub delay: f64,
    /// Length (seconds)
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn note(freq: f32, wave: Wave, delay: f64, duration: f64, gain: f32) -> Note {
    Note {
        freq,
        end_freq: None,
        wave,
        delay,
        duration,
        gain,
    }
}

const fn sweep(freq: f32, end_freq: f32, wave: Wave, duration: f64, gain: f32) -> Note {
    Note {
        freq,
        end_freq: Some(end_freq),
        wave,
        delay: 0.0,
        duration,
        gain,
    }
}

impl SoundEffect {
    /// The sound for a game event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::SessionStarted => Some(Self::Start),
            GameEvent::TargetHit {
                kind: TargetKind::Bonus,
                ..
            } => Some(Self::BonusHit),
            GameEvent::TargetHit { .. } => Some(Self::TargetHit),
            GameEvent::Missed => Some(Self::Miss),
            GameEvent::TargetExpired { .. } => Some(Self::Expire),
            GameEvent::PowerUpCollected { .. } => Some(Self::PowerUp),
            GameEvent::ComboTier { .. } => Some(Self::ComboTier),
            GameEvent::GameOver {
                new_record: true, ..
            } => Some(Self::HighScore),
            GameEvent::GameOver { .. } => Some(Self::GameOver),
            GameEvent::TargetSpawned { .. }
            | GameEvent::PowerUpSpawned { .. }
            | GameEvent::EffectExpired { .. }
            | GameEvent::ComboDecayed
            | GameEvent::DifficultyUp { .. } => None,
        }
    }

    /// Notes making up the effect
    pub fn notes(self) -> Vec<Note> {
        match self {
            // Rising two-note chirp
            SoundEffect::Start => vec![
                note(440.0, Wave::Triangle, 0.0, 0.12, 0.3),
                note(660.0, Wave::Triangle, 0.1, 0.2, 0.3),
            ],
            // Short bright pop
            SoundEffect::TargetHit => vec![sweep(600.0, 900.0, Wave::Sine, 0.08, 0.4)],
            SoundEffect::BonusHit => [1200.0, 1800.0, 2400.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| note(freq, Wave::Sine, i as f64 * 0.03, 0.3, 0.2))
                .collect(),
            // Dull thud
            SoundEffect::Miss => vec![sweep(150.0, 60.0, Wave::Square, 0.15, 0.25)],
            SoundEffect::Expire => vec![sweep(300.0, 120.0, Wave::Triangle, 0.2, 0.2)],
            SoundEffect::PowerUp => [600.0, 800.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| note(freq, Wave::Sine, i as f64 * 0.05, 0.15, 0.3))
                .collect(),
            SoundEffect::ComboTier => [400.0, 500.0, 600.0, 800.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| note(freq, Wave::Triangle, i as f64 * 0.06, 0.25, 0.3))
                .collect(),
            SoundEffect::GameOver => [400.0, 350.0, 300.0, 200.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| note(freq, Wave::Sine, i as f64 * 0.2, 0.4, 0.3))
                .collect(),
            SoundEffect::HighScore => [523.0, 659.0, 784.0, 1047.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| note(freq, Wave::Square, i as f64 * 0.12, 0.3, 0.15))
                .collect(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Note, SoundEffect, Wave};
    use crate::settings::Settings;

    impl From<Wave> for OscillatorType {
        fn from(wave: Wave) -> Self {
            match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
            }
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for note in effect.notes() {
                self.play_note(ctx, &note);
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_note(&self, ctx: &AudioContext, note: &Note) {
            let Some((osc, gain)) = self.create_osc(ctx, note.freq, note.wave.into()) else {
                return;
            };
            let t = ctx.current_time() + note.delay;
            let end = t + note.duration;

            gain.gain().set_value_at_time(note.gain * self.volume, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
            if let Some(end_freq) = note.end_freq {
                osc.frequency().set_value_at_time(note.freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end_freq, end)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(end + 0.05).ok();
        }
    }
}
