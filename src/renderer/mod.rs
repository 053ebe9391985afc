//! 2D rendering
//!
//! `render` is a pure function of the session state: it issues primitive
//! draw calls on a `Surface` and never mutates gameplay. The browser host
//! backs `Surface` with a canvas 2D context.

pub mod palette;
pub mod shapes;

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::state::{Bounds, Rgba, SessionState, TargetKind};
use palette::{colors, with_alpha};

/// Width of the time indicator stroke
const TIME_INDICATOR_WIDTH: f32 = 3.0;
/// Popup / message / icon font sizes
const POPUP_FONT_PX: f32 = 20.0;
const MESSAGE_FONT_PX: f32 = 28.0;
const ICON_FONT_PX: f32 = 14.0;

/// Drawing primitives the renderer needs
pub trait Surface {
    /// Fill the whole canvas
    fn clear(&mut self, bounds: Bounds, color: Rgba);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Stroke an arc of `radius` from `start` to `end` radians (clockwise on screen)
    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Rgba);

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);

    fn fill_star(&mut self, center: Vec2, outer: f32, inner: f32, points: u32, color: Rgba) {
        let outline = shapes::star_outline(center, outer, inner, points);
        self.fill_polygon(&outline, color);
    }

    /// Text centered on `pos`
    fn fill_text(&mut self, text: &str, pos: Vec2, size_px: f32, color: Rgba);
}

/// Draw one frame of `state`
pub fn render(state: &SessionState, settings: &Settings, now: f64, surface: &mut impl Surface) {
    surface.clear(state.bounds, colors::BACKGROUND);

    for target in &state.targets {
        if let Some(hit_at) = target.hit_at {
            draw_hit_flash(surface, target.pos, target.radius, now - hit_at);
            continue;
        }

        let radius = target.current_radius(now);
        match target.kind {
            TargetKind::Bonus => {
                let pulse = 1.0 + 0.06 * ((now / 120.0).sin() as f32);
                surface.fill_star(target.pos, radius * pulse, radius * 0.5, 5, target.color);
            }
            TargetKind::Moving => {
                surface.fill_circle(target.pos, radius, target.color);
                surface.fill_circle(target.pos, radius * 0.25, colors::MOVING_CORE);
            }
            TargetKind::Shrinking => {
                surface.stroke_arc(target.pos, target.radius, 0.0, TAU, 1.0, colors::SHRINK_GHOST);
                surface.fill_circle(target.pos, radius, target.color);
            }
            TargetKind::Normal => surface.fill_circle(target.pos, radius, target.color),
        }

        if settings.time_indicator {
            let remaining = target.remaining_fraction(now);
            if remaining > 0.0 {
                let start = -PI / 2.0;
                surface.stroke_arc(
                    target.pos,
                    radius,
                    start,
                    start + TAU * remaining,
                    TIME_INDICATOR_WIDTH,
                    colors::TIME_INDICATOR,
                );
            }
        }
    }

    for power_up in state.power_ups.iter().filter(|p| !p.is_hit()) {
        surface.fill_circle(power_up.pos, power_up.radius, power_up.kind.color());
        surface.stroke_arc(power_up.pos, power_up.radius, 0.0, TAU, 2.0, colors::POWER_UP_RIM);
        surface.fill_text(power_up.kind.icon(), power_up.pos, ICON_FONT_PX, colors::TEXT);
    }

    if settings.score_popups {
        for popup in &state.popups {
            let t = ((now - popup.born_at) / POPUP_LIFETIME_MS).clamp(0.0, 1.0) as f32;
            let pos = popup.pos - Vec2::new(0.0, POPUP_RISE * t);
            surface.fill_text(&popup.text, pos, POPUP_FONT_PX, with_alpha(colors::TEXT, 1.0 - t));
        }
    }

    if settings.messages {
        let anchor = Vec2::new(state.bounds.width / 2.0, state.bounds.height / 3.0);
        for (i, message) in state.messages.iter().enumerate() {
            let t = ((now - message.born_at) / MESSAGE_LIFETIME_MS).clamp(0.0, 1.0) as f32;
            // Hold, then fade over the last third
            let alpha = ((1.0 - t) * 3.0).min(1.0);
            let pos = anchor + Vec2::new(0.0, i as f32 * MESSAGE_FONT_PX * 1.3);
            surface.fill_text(&message.text, pos, MESSAGE_FONT_PX, with_alpha(message.color, alpha));
        }
    }
}

/// Expanding white ring over the hit flash window
fn draw_hit_flash(surface: &mut impl Surface, pos: Vec2, radius: f32, age: f64) {
    if !(0.0..HIT_FLASH_MS).contains(&age) {
        return;
    }
    let t = (age / HIT_FLASH_MS) as f32;
    surface.stroke_arc(
        pos,
        radius * (1.0 + t),
        0.0,
        TAU,
        3.0,
        with_alpha(colors::HIT_FLASH, 1.0 - t),
    );
}
