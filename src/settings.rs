//! Player preferences
//!
//! Persisted next to the high score, under their own key. The game only
//! reads them; missing or unreadable values fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Floating "+N" text on hits
    pub score_popups: bool,
    /// Announcement banners (power-ups, combo tiers)
    pub messages: bool,
    /// Time indicator arc around live targets
    pub time_indicator: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            score_popups: true,
            messages: true,
            time_indicator: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "reflexRushSettings";

    /// Final gain for sound effects
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &impl Storage) -> Self {
        match persistence::load_json::<Settings>(storage, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {e}");
                Self::default()
            }
        }
    }
}
