//! Viewport: the world ↔ screen transform.
//!
//! Owns the zoom ratio and pan offset. Not part of the document — a loaded
//! scene recomputes its viewport via [`Viewport::auto_fit`].

use crate::scene::Workspace;
use kurbo::{Affine, Point, Rect, Vec2};

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 1.0;
pub const ZOOM_STEP: f64 = 0.05;

/// Fraction of the container left around the workspace by auto-fit.
const FIT_RATIO: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// World-to-screen scale factor, always within [`MIN_ZOOM`, `MAX_ZOOM`].
    zoom: f64,
    /// Screen-space offset of the world origin.
    pan: Vec2,
    container_width: f64,
    container_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            container_width: 0.0,
            container_height: 0.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn container_size(&self) -> (f64, f64) {
        (self.container_width, self.container_height)
    }

    fn has_container(&self) -> bool {
        self.container_width > 0.0 && self.container_height > 0.0
    }

    /// Update the container dimensions. Callers re-fit afterwards; resizing
    /// alone does not move the scene.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container_width = width;
        self.container_height = height;
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        self.transform() * p
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        self.transform().inverse() * p
    }

    /// Step the zoom, keeping the world point under the container center
    /// fixed. No-op before the container has a size.
    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-ZOOM_STEP);
    }

    fn zoom_by(&mut self, step: f64) {
        if !self.has_container() {
            return;
        }
        let pivot = Point::new(self.container_width / 2.0, self.container_height / 2.0);
        let anchor = self.screen_to_world(pivot);
        self.zoom = (self.zoom + step).clamp(MIN_ZOOM, MAX_ZOOM);
        // Re-solve pan so `anchor` still lands on `pivot`.
        self.pan = pivot.to_vec2() - anchor.to_vec2() * self.zoom;
    }

    /// Fit the workspace (plus padding) into the container, centered.
    /// No-op while the container has no positive area.
    pub fn auto_fit(&mut self, workspace: &Workspace) {
        if !self.has_container() {
            log::debug!("auto_fit skipped: container has no size");
            return;
        }
        let scale_x = self.container_width / workspace.width;
        let scale_y = self.container_height / workspace.height;
        self.zoom = (scale_x.min(scale_y) * FIT_RATIO).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = Vec2::new(
            (self.container_width - workspace.width * self.zoom) / 2.0,
            (self.container_height - workspace.height * self.zoom) / 2.0,
        );
    }

    /// The workspace rectangle in screen coordinates under the current
    /// transform.
    pub fn workspace_screen_rect(&self, workspace: &Workspace) -> Rect {
        self.transform().transform_rect_bbox(workspace.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fitted() -> (Viewport, Workspace) {
        let ws = Workspace::default();
        let mut vp = Viewport::new();
        vp.set_container_size(1280.0, 800.0);
        vp.auto_fit(&ws);
        (vp, ws)
    }

    #[test]
    fn zoom_clamps_at_ceiling() {
        let (mut vp, _) = fitted();
        for _ in 0..100 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn zoom_clamps_at_floor() {
        let (mut vp, _) = fitted();
        for _ in 0..100 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn zoom_pivots_on_container_center() {
        let (mut vp, _) = fitted();
        let center = Point::new(640.0, 400.0);
        let before = vp.screen_to_world(center);
        vp.zoom_in();
        let after = vp.screen_to_world(center);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn auto_fit_centers_workspace() {
        let (vp, ws) = fitted();
        // 900x1200 into 1280x800: height-bound, zoom = 800/1200 * 0.85
        let expected = (800.0 / 1200.0 * 0.85f64).clamp(MIN_ZOOM, MAX_ZOOM);
        assert!((vp.zoom() - expected).abs() < 1e-12);

        let screen = vp.workspace_screen_rect(&ws);
        let left_gap = screen.x0;
        let right_gap = 1280.0 - screen.x1;
        assert!((left_gap - right_gap).abs() < 1e-9);
        let top_gap = screen.y0;
        let bottom_gap = 800.0 - screen.y1;
        assert!((top_gap - bottom_gap).abs() < 1e-9);
    }

    #[test]
    fn auto_fit_noop_without_container() {
        let ws = Workspace::default();
        let mut vp = Viewport::new();
        let before = vp;
        vp.auto_fit(&ws);
        assert_eq!(vp, before);

        vp.set_container_size(800.0, 0.0);
        vp.auto_fit(&ws);
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn roundtrip_world_screen() {
        let (vp, _) = fitted();
        let p = Point::new(123.0, 456.0);
        let back = vp.screen_to_world(vp.world_to_screen(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }
}
