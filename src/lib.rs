//! Reflex Rush - A single-screen arcade reflex game
//!
//! Core modules:
//! - `sim`: Game-state simulation (spawning, hit resolution, combo, timers)
//! - `session`: Session controller driving the simulation and its timers
//! - `renderer`: 2D drawing of the simulation state onto a `Surface`
//! - `hud`: Declarative HUD projection and sink trait
//! - `platform`: Browser glue (canvas, DOM HUD)
//! - `persistence`: Key/value storage slots
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod highscores;
pub mod hud;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use hud::{HudSink, HudSnapshot, SessionSummary};
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal frame duration (ms) that per-frame velocities are expressed in
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest frame delta honoured before clamping (tab switches, stalls)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Fallback canvas size when the host reports nothing usable
    pub const DEFAULT_CANVAS_WIDTH: f32 = 800.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;

    /// Delay between a hit and the entity leaving the collection
    pub const HIT_REMOVAL_DELAY_MS: f64 = 100.0;
    /// Delay before a chained extra target appears
    pub const CHAIN_SPAWN_DELAY_MS: f64 = 200.0;

    /// Hit flash animation length
    pub const HIT_FLASH_MS: f64 = 200.0;
    /// Score popup lifetime (~20 frames at 60 Hz)
    pub const POPUP_LIFETIME_MS: f64 = 330.0;
    /// Score popup rise over its lifetime (px)
    pub const POPUP_RISE: f32 = 40.0;
    /// On-screen announcement lifetime
    pub const MESSAGE_LIFETIME_MS: f64 = 1500.0;

    /// Smallest fraction of its base radius a shrinking target renders at
    pub const MIN_RADIUS_FRACTION: f32 = 0.2;
}

/// Round a millisecond span up to whole seconds (never negative)
#[inline]
pub fn ceil_secs(ms: f64) -> u32 {
    (ms / 1000.0).ceil().max(0.0) as u32
}

/// Convert a packed 0xRRGGBB color to normalized RGBA
#[inline]
pub const fn rgb_hex(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Format a normalized RGBA color as a CSS color string
pub fn css_color(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {:.3})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}
