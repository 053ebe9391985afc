//! Outline geometry for primitives the `Surface` trait doesn't draw natively

use glam::Vec2;
use std::f32::consts::PI;

/// Point on a circle at angle `theta`
#[inline]
fn on_circle(center: Vec2, radius: f32, theta: f32) -> Vec2 {
    Vec2::new(
        center.x + radius * theta.cos(),
        center.y + radius * theta.sin(),
    )
}

/// Outline of a star with `points` tips, first tip pointing up
pub fn star_outline(center: Vec2, outer: f32, inner: f32, points: u32) -> Vec<Vec2> {
    let points = points.max(2);
    let step = PI / points as f32;
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            on_circle(center, radius, -PI / 2.0 + i as f32 * step)
        })
        .collect()
}
