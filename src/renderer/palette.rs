//! Fixed colors for everything that isn't a target

use crate::sim::state::Rgba;

/// Colors for game elements
pub mod colors {
    use super::Rgba;

    pub const BACKGROUND: Rgba = [0.07, 0.07, 0.1, 1.0];
    pub const TIME_INDICATOR: Rgba = [1.0, 1.0, 1.0, 1.0];
    pub const HIT_FLASH: Rgba = [1.0, 1.0, 1.0, 1.0];
    pub const TEXT: Rgba = [1.0, 1.0, 1.0, 1.0];
    pub const POWER_UP_RIM: Rgba = [1.0, 1.0, 1.0, 0.8];
    /// Center dot marking Moving targets
    pub const MOVING_CORE: Rgba = [1.0, 1.0, 1.0, 0.6];
    /// Ghost outline of a Shrinking target's starting size
    pub const SHRINK_GHOST: Rgba = [1.0, 1.0, 1.0, 0.25];
}

/// Scale a color's alpha
pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}
