//! Viewport ↔ logical canvas transform.
//!
//! `logical = (viewport - origin + scroll - pan) / zoom`, and the exact
//! inverse for rendering. View state is never part of the undoable
//! document.

use crate::config::EditorConfig;
use kurbo::{Affine, Point, Size, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left of the canvas element in viewport coordinates.
    pub origin: Vec2,
    /// Scroll offset of the scroll container.
    pub scroll: Vec2,
    /// Pan offset applied to the canvas.
    pub pan: Vec2,
    pub zoom: f64,
    /// Visible size of the scroll container.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            scroll: Vec2::ZERO,
            pan: Vec2::ZERO,
            zoom: 1.0,
            size: Size::new(1200.0, 800.0),
        }
    }
}

impl Viewport {
    pub fn to_logical(&self, viewport_point: Point) -> Point {
        ((viewport_point.to_vec2() - self.origin + self.scroll - self.pan) / self.zoom).to_point()
    }

    pub fn to_viewport(&self, logical: Point) -> Point {
        (logical.to_vec2() * self.zoom + self.pan - self.scroll + self.origin).to_point()
    }

    /// Logical → viewport as an affine map, for renderers.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.pan - self.scroll + self.origin) * Affine::scale(self.zoom)
    }

    /// Convert a viewport-space distance to logical units.
    pub fn to_logical_distance(&self, d: f64) -> f64 {
        d / self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64, config: &EditorConfig) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(config.min_zoom, config.max_zoom);
        }
    }

    /// Step the zoom by `steps` increments of the configured step.
    pub fn zoom_by(&mut self, steps: f64, config: &EditorConfig) {
        let z = self.zoom + steps * config.zoom_step;
        // Keep repeated stepping free of float drift
        self.set_zoom((z * 100.0).round() / 100.0, config);
    }

    /// Ctrl+wheel: wheel up zooms in by one step, wheel down zooms out.
    pub fn wheel(&mut self, delta_y: f64, config: &EditorConfig) {
        if delta_y < 0.0 {
            self.zoom_by(1.0, config);
        } else if delta_y > 0.0 {
            self.zoom_by(-1.0, config);
        }
    }

    /// Fit `content` (or the fallback size) inside the visible area with a
    /// margin, never zooming past the fit maximum. Resets pan and scroll.
    pub fn fit_to_view(&mut self, content: Option<Size>, config: &EditorConfig) {
        let content = content
            .filter(|s| s.width > 0.0 && s.height > 0.0)
            .unwrap_or(config.fallback_content);
        let avail_w = (self.size.width - config.fit_margin).max(1.0);
        let avail_h = (self.size.height - config.fit_margin).max(1.0);
        let z = (avail_w / content.width)
            .min(avail_h / content.height)
            .min(config.fit_max_zoom);
        self.set_zoom((z * 100.0).round() / 100.0, config);
        self.pan = Vec2::ZERO;
        self.scroll = Vec2::ZERO;
    }

    /// Back to 1:1 with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
        self.scroll = Vec2::ZERO;
    }
}
