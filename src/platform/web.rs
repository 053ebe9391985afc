//! Browser implementations of the drawing, HUD and clock seams

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::CanvasRect;
use crate::css_color;
use crate::hud::{HudSink, HudSnapshot, SessionSummary};
use crate::renderer::Surface;
use crate::sim::state::{Bounds, Message, Rgba};

/// Milliseconds from `performance.now()`, or `Date.now()` without it
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Canvas 2D context behind the `Surface` seam
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Current drawing bounds
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    pub fn rect(&self) -> CanvasRect {
        let r = self.canvas.get_bounding_client_rect();
        CanvasRect {
            left: r.left() as f32,
            top: r.top() as f32,
            width: r.width() as f32,
            height: r.height() as f32,
            pixel_width: self.canvas.width() as f32,
            pixel_height: self.canvas.height() as f32,
        }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, bounds: Bounds, color: Rgba) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx
            .fill_rect(0.0, 0.0, bounds.width as f64, bounds.height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            self.ctx.set_fill_style_str(&css_color(color));
            self.ctx.fill();
        }
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Rgba) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, start as f64, end as f64)
            .is_ok()
        {
            self.ctx.set_stroke_style_str(&css_color(color));
            self.ctx.set_line_width(width as f64);
            self.ctx.stroke();
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, size_px: f32, color: Rgba) {
        self.ctx.set_font(&format!("bold {}px sans-serif", size_px.round()));
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }
}

/// Show or hide an element by toggling its `hidden` class
pub fn set_visible(document: &Document, id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.class_list().toggle_with_force("hidden", !visible);
    }
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

/// HUD written into DOM text nodes
pub struct DomHud {
    document: Document,
    last: Option<HudSnapshot>,
}

impl DomHud {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            last: None,
        }
    }
}

impl HudSink for DomHud {
    fn update(&mut self, snapshot: &HudSnapshot) {
        // Skip DOM writes when nothing changed (called every frame)
        if self.last.as_ref() == Some(snapshot) {
            return;
        }
        let doc = &self.document;
        set_text(doc, "score", &snapshot.score.to_string());
        set_text(doc, "lives", &snapshot.lives.to_string());
        set_text(doc, "time", &snapshot.time_remaining.to_string());
        set_text(doc, "combo", &snapshot.combo_label());
        set_text(doc, "high-score", &snapshot.high_score.to_string());

        let badges: Vec<String> = snapshot.badges.iter().map(|b| b.label()).collect();
        set_text(doc, "power-ups", &badges.join(" | "));
        set_visible(doc, "power-ups", !badges.is_empty());

        self.last = Some(snapshot.clone());
    }

    fn announce(&mut self, message: &Message) {
        log::debug!("{}", message.text);
    }

    fn game_over(&mut self, summary: &SessionSummary) {
        let doc = &self.document;
        set_text(doc, "final-score", &summary.score.to_string());
        set_text(doc, "final-combo", &summary.max_combo.to_string());
        set_text(doc, "final-high-score", &summary.high_score.to_string());
        set_visible(doc, "new-record", summary.new_record);
        set_visible(doc, "game-screen", false);
        set_visible(doc, "game-over-screen", true);
    }
}
