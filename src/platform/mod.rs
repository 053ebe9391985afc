//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Pointer coordinates (client space to canvas space)
//! - Drawing (canvas 2D context behind `Surface`)
//! - HUD (DOM text nodes behind `HudSink`)
//! - Time (`performance.now()` on web)

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

/// Canvas placement on the page, as reported by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    /// CSS size
    pub width: f32,
    pub height: f32,
    /// Backing store size (canvas.width / canvas.height)
    pub pixel_width: f32,
    pub pixel_height: f32,
}

impl CanvasRect {
    /// Map a client-space pointer position into canvas pixels.
    /// `None` when the canvas has no usable size or the input isn't finite.
    pub fn to_canvas(&self, client_x: f32, client_y: f32) -> Option<Vec2> {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        if !usable(self.width) || !usable(self.height) {
            return None;
        }
        let scale = Vec2::new(
            if usable(self.pixel_width) { self.pixel_width / self.width } else { 1.0 },
            if usable(self.pixel_height) { self.pixel_height / self.height } else { 1.0 },
        );
        let point = (Vec2::new(client_x, client_y) - Vec2::new(self.left, self.top)) * scale;
        point.is_finite().then_some(point)
    }
}
