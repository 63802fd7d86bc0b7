//! The editor session — the single API surface consumed by the UI layer.
//!
//! The session exclusively owns the scene, viewport, history, clipboard,
//! and selection; nothing else mutates them. All methods run synchronously
//! on the caller's thread. Every user-initiated structural or style change
//! records exactly one history snapshot; drag-style gestures are bracketed
//! with [`EditorSession::begin_gesture`] / [`EditorSession::end_gesture`]
//! so a whole gesture coalesces into one undo step.

use easel_core::document;
use easel_core::model::{
    Color, FontSpec, FontStyle, ImageFilter, ObjectKind, ObjectStyle, SceneObject, TextAlign,
    Transform,
};
use easel_core::{ObjectId, Scene, Viewport};
use smallvec::SmallVec;

use crate::ai::ImageServices;
use crate::clipboard::Clipboard;
use crate::history::History;
use crate::loader::{LoadToken, PendingLoads};
use crate::selection::{SelectionView, StyleDefaults};

/// Shape presets behind the toolbar's add buttons.
///
/// The inverted triangle and diamond are polygons, matching how they render
/// and serialize; the preset only decides the point layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSpec {
    Rectangle,
    SoftRectangle,
    Triangle,
    InvertedTriangle,
    Diamond,
    Circle,
}

// Preset dimensions for freshly added objects.
const RECT_SIZE: f64 = 400.0;
const SOFT_CORNER_RADIUS: f64 = 50.0;
const TRIANGLE_SIZE: f64 = 400.0;
const DIAMOND_SIZE: f64 = 600.0;
const CIRCLE_RADIUS: f64 = 225.0;

pub struct EditorSession {
    scene: Scene,
    viewport: Viewport,
    history: History,
    clipboard: Clipboard,
    selection: SmallVec<[ObjectId; 8]>,
    defaults: StyleDefaults,
    pending: PendingLoads,
    gesture_depth: u32,
    gesture_snapshot: Option<String>,
    gesture_dirty: bool,
    draw_stroke: Option<Vec<(f64, f64)>>,
}

impl EditorSession {
    pub fn new() -> Self {
        let scene = Scene::new();
        let mut history = History::default();
        match document::to_json(&scene) {
            Ok(doc) => history.reset(doc),
            Err(e) => log::error!("could not seed history: {e}"),
        }
        Self {
            scene,
            viewport: Viewport::new(),
            history,
            clipboard: Clipboard::new(),
            selection: SmallVec::new(),
            defaults: StyleDefaults::default(),
            pending: PendingLoads::new(),
            gesture_depth: 0,
            gesture_snapshot: None,
            gesture_dirty: false,
            draw_stroke: None,
        }
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selected(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    /// Style-panel view of the current selection.
    pub fn active(&self) -> SelectionView<'_> {
        SelectionView::new(&self.scene, &self.selection, &self.defaults)
    }

    // ─── History plumbing ────────────────────────────────────────────────

    /// Record the current scene as one history entry. Inside a gesture the
    /// snapshot is deferred to `end_gesture`.
    fn record(&mut self, label: &str) {
        if self.gesture_depth > 0 {
            self.gesture_dirty = true;
            return;
        }
        match document::to_json(&self.scene) {
            Ok(doc) => self.history.push(label, doc),
            Err(e) => log::error!("history snapshot failed: {e}"),
        }
    }

    /// Open a gesture window (drag, resize, draw). Nested calls are
    /// counted; only the outermost close can commit.
    pub fn begin_gesture(&mut self) {
        if self.gesture_depth == 0 {
            self.gesture_snapshot = document::to_json(&self.scene).ok();
            self.gesture_dirty = false;
        }
        self.gesture_depth += 1;
    }

    /// Close a gesture window. Commits a single history entry iff any
    /// tracked mutation ran and the scene actually changed.
    pub fn end_gesture(&mut self, label: &str) {
        if self.gesture_depth == 0 {
            return;
        }
        self.gesture_depth -= 1;
        if self.gesture_depth > 0 {
            return;
        }
        let before = self.gesture_snapshot.take();
        if self.gesture_dirty {
            match document::to_json(&self.scene) {
                Ok(after) if before.as_deref() != Some(after.as_str()) => {
                    self.history.push(label, after);
                }
                Ok(_) => {}
                Err(e) => log::error!("gesture snapshot failed: {e}"),
            }
        }
        self.gesture_dirty = false;
    }

    pub fn undo(&mut self) -> bool {
        let doc = match self.history.undo() {
            Some(entry) => entry.doc.clone(),
            None => return false,
        };
        self.restore(&doc)
    }

    pub fn redo(&mut self) -> bool {
        let doc = match self.history.redo() {
            Some(entry) => entry.doc.clone(),
            None => return false,
        };
        self.restore(&doc)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, doc: &str) -> bool {
        match document::from_json(doc) {
            Ok(scene) => {
                self.scene = scene;
                self.selection.clear();
                true
            }
            Err(e) => {
                // Snapshots are produced by our own serializer; failing to
                // read one back is a bug, not a user error.
                log::error!("history restore failed: {e}");
                false
            }
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Serialize the scene to its portable JSON document.
    pub fn save_json(&self) -> Result<String, String> {
        document::to_json(&self.scene)
    }

    /// Replace the scene from a JSON document. On failure the current
    /// scene, selection, and history are left untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), String> {
        let scene = document::from_json(json)?;
        let seed = document::to_json(&scene)?;
        self.scene = scene;
        self.selection.clear();
        self.pending.invalidate_all();
        self.viewport.auto_fit(&self.scene.workspace);
        // Seed rather than push: loading must not be an undoable action.
        self.history.reset(seed);
        Ok(())
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn auto_zoom(&mut self) {
        self.viewport.auto_fit(&self.scene.workspace);
    }

    /// Report new container dimensions (element resize), then re-fit.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.viewport.set_container_size(width, height);
        self.viewport.auto_fit(&self.scene.workspace);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Replace the selection; unknown ids are dropped. Selection changes
    /// are not history-tracked.
    pub fn select(&mut self, ids: &[ObjectId]) {
        self.selection.clear();
        for &id in ids {
            if self.scene.contains(id) && !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    pub fn select_all(&mut self) {
        self.selection = self.scene.objects.iter().map(|o| o.id).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn select_only(&mut self, id: ObjectId) {
        self.selection.clear();
        self.selection.push(id);
    }

    // ─── Object creation ─────────────────────────────────────────────────

    fn object_style(&self) -> ObjectStyle {
        ObjectStyle {
            fill: self.defaults.fill,
            stroke: self.defaults.stroke,
            stroke_width: self.defaults.stroke_width,
            stroke_dash: self.defaults.stroke_dash.clone(),
            opacity: 1.0,
        }
    }

    fn insert_centered(&mut self, kind: ObjectKind, style: ObjectStyle, label: &str) -> ObjectId {
        let mut object = SceneObject::new(kind, Transform::default(), style);
        self.scene.center_in_workspace(&mut object);
        let id = self.scene.add(object);
        self.select_only(id);
        self.record(label);
        id
    }

    /// Add a shape preset, centered in the workspace and solely selected.
    pub fn add_shape(&mut self, spec: ShapeSpec) -> ObjectId {
        let kind = match spec {
            ShapeSpec::Rectangle => ObjectKind::Rect {
                width: RECT_SIZE,
                height: RECT_SIZE,
                corner_radius: 0.0,
            },
            ShapeSpec::SoftRectangle => ObjectKind::Rect {
                width: RECT_SIZE,
                height: RECT_SIZE,
                corner_radius: SOFT_CORNER_RADIUS,
            },
            ShapeSpec::Triangle => ObjectKind::Triangle {
                width: TRIANGLE_SIZE,
                height: TRIANGLE_SIZE,
            },
            ShapeSpec::InvertedTriangle => ObjectKind::Polygon {
                points: vec![
                    (0.0, 0.0),
                    (TRIANGLE_SIZE, 0.0),
                    (TRIANGLE_SIZE / 2.0, TRIANGLE_SIZE),
                ],
            },
            ShapeSpec::Diamond => ObjectKind::Polygon {
                points: vec![
                    (DIAMOND_SIZE / 2.0, 0.0),
                    (DIAMOND_SIZE, DIAMOND_SIZE / 2.0),
                    (DIAMOND_SIZE / 2.0, DIAMOND_SIZE),
                    (0.0, DIAMOND_SIZE / 2.0),
                ],
            },
            ShapeSpec::Circle => ObjectKind::Circle {
                radius: CIRCLE_RADIUS,
            },
        };
        self.insert_centered(kind, self.object_style(), "add shape")
    }

    /// Add a text object at the session font defaults.
    pub fn add_text(&mut self, content: &str) -> ObjectId {
        let kind = ObjectKind::Text {
            content: content.to_string(),
            font: FontSpec {
                family: self.defaults.font_family.clone(),
                ..FontSpec::default()
            },
        };
        self.insert_centered(kind, self.object_style(), "add text")
    }

    // ─── Image lifecycle ─────────────────────────────────────────────────

    /// Start adding an image. The object is inserted only once the host
    /// reports the resource loaded via [`EditorSession::finish_image_load`].
    pub fn add_image(&mut self, url: &str) -> LoadToken {
        log::debug!("image load started: {url}");
        self.pending.begin(url)
    }

    /// Complete a pending image load with the decoded pixel dimensions.
    /// Returns the new object's id, or `None` for stale/cancelled tokens
    /// and degenerate dimensions.
    pub fn finish_image_load(
        &mut self,
        token: LoadToken,
        width: f64,
        height: f64,
    ) -> Option<ObjectId> {
        let src = self.pending.complete(token)?;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("image {src} reported degenerate size {width}x{height}");
            return None;
        }
        // Fit oversized images inside the workspace, preserving aspect.
        let ws = &self.scene.workspace;
        let fit = (ws.width / width).min(ws.height / height).min(1.0);
        let mut object = SceneObject::new(
            ObjectKind::Image {
                src,
                width,
                height,
                filter: ImageFilter::None,
            },
            Transform::default(),
            self.object_style(),
        );
        object.transform.scale_x = fit;
        object.transform.scale_y = fit;
        self.scene.center_in_workspace(&mut object);
        let id = self.scene.add(object);
        self.select_only(id);
        self.record("add image");
        self.viewport.auto_fit(&self.scene.workspace);
        Some(id)
    }

    /// Report a failed fetch/decode. The add is aborted; no history entry.
    pub fn fail_image_load(&mut self, token: LoadToken) {
        if self.pending.cancel(token) {
            log::warn!("image load failed; add aborted");
        }
    }

    /// Cancel a pending load (teardown, rapid re-invocation).
    pub fn cancel_image_load(&mut self, token: LoadToken) -> bool {
        self.pending.cancel(token)
    }

    pub fn pending_image_loads(&self) -> usize {
        self.pending.len()
    }

    /// Swap the first selected image's source for a background-removed
    /// copy. The scene is untouched when the collaborator fails.
    pub fn remove_selected_background(
        &mut self,
        services: &dyn ImageServices,
    ) -> Result<ObjectId, String> {
        let id = *self
            .selection
            .first()
            .ok_or_else(|| "nothing selected".to_string())?;
        let src = match self.scene.get(id).map(|o| &o.kind) {
            Some(ObjectKind::Image { src, .. }) => src.clone(),
            _ => return Err("selected object is not an image".to_string()),
        };
        let replacement = services.remove_background(&src)?;
        if let Some(ObjectKind::Image { src, .. }) =
            self.scene.get_mut(id).map(|o| &mut o.kind)
        {
            *src = replacement;
        }
        self.record("remove background");
        Ok(id)
    }

    // ─── Structural mutators ─────────────────────────────────────────────

    /// Delete every selected object. Returns how many were removed; an
    /// empty selection records nothing.
    pub fn delete_selected(&mut self) -> usize {
        let ids: SmallVec<[ObjectId; 8]> = std::mem::take(&mut self.selection);
        let mut removed = 0;
        for id in ids {
            if self.scene.remove(id).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.record("delete");
        }
        removed
    }

    /// Shift each selected object one z-order step toward the front.
    pub fn bring_forward(&mut self) -> bool {
        // Front-most first, so adjacent selected objects don't leapfrog
        // through each other.
        let mut ids: Vec<ObjectId> = self.selection.to_vec();
        ids.sort_by_key(|id| std::cmp::Reverse(self.scene.index_of(*id).unwrap_or(0)));
        let mut changed = false;
        for id in ids {
            changed |= self.scene.bring_forward(id);
        }
        if changed {
            self.record("reorder");
        }
        changed
    }

    /// Shift each selected object one z-order step toward the back. The
    /// workspace always stays beneath all content.
    pub fn send_backward(&mut self) -> bool {
        let mut ids: Vec<ObjectId> = self.selection.to_vec();
        ids.sort_by_key(|id| self.scene.index_of(*id).unwrap_or(usize::MAX));
        let mut changed = false;
        for id in ids {
            changed |= self.scene.send_backward(id);
        }
        if changed {
            self.record("reorder");
        }
        changed
    }

    /// Move every selected object by a world-space delta.
    pub fn translate_selected(&mut self, dx: f64, dy: f64) -> bool {
        let mut moved = false;
        for id in self.selection.clone() {
            if let Some(object) = self.scene.get_mut(id) {
                object.transform.x += dx;
                object.transform.y += dy;
                moved = true;
            }
        }
        if moved {
            self.record("move");
        }
        moved
    }

    /// Replace one object's whole transform (host-driven resize/rotate).
    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) -> bool {
        match self.scene.get_mut(id) {
            Some(object) => {
                object.transform = transform;
                self.record("transform");
                true
            }
            None => false,
        }
    }

    // ─── Workspace mutators ──────────────────────────────────────────────

    pub fn set_workspace_size(&mut self, width: f64, height: f64) -> Result<(), String> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(format!("invalid workspace size {width}x{height}"));
        }
        self.scene.workspace.width = width;
        self.scene.workspace.height = height;
        self.record("resize workspace");
        self.viewport.auto_fit(&self.scene.workspace);
        Ok(())
    }

    pub fn set_workspace_fill(&mut self, fill: Color) {
        self.scene.workspace.fill = fill;
        self.record("workspace background");
    }

    // ─── Style mutators ──────────────────────────────────────────────────

    fn update_selected(&mut self, label: &str, mut apply: impl FnMut(&mut SceneObject) -> bool) {
        let mut touched = false;
        for id in self.selection.clone() {
            if let Some(object) = self.scene.get_mut(id) {
                touched |= apply(object);
            }
        }
        if touched {
            self.record(label);
        }
    }

    /// Set the fill color on every selected object; also becomes the
    /// default for new objects.
    pub fn set_fill_color(&mut self, color: Color) {
        self.defaults.fill = color;
        self.update_selected("fill color", |object| {
            object.style.fill = color;
            true
        });
    }

    /// Set the stroke color on every selected object. Text objects have no
    /// stroke, so for them the change lands on the fill instead.
    pub fn set_stroke_color(&mut self, color: Color) {
        self.defaults.stroke = color;
        self.update_selected("stroke color", |object| {
            match object.kind {
                ObjectKind::Text { .. } => object.style.fill = color,
                _ => object.style.stroke = color,
            }
            true
        });
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.defaults.stroke_width = width;
        self.update_selected("stroke width", |object| {
            object.style.stroke_width = width;
            true
        });
    }

    pub fn set_stroke_dash(&mut self, dash: &[f64]) {
        self.defaults.stroke_dash = SmallVec::from_slice(dash);
        let dash: SmallVec<[f64; 4]> = SmallVec::from_slice(dash);
        self.update_selected("stroke dash", |object| {
            object.style.stroke_dash = dash.clone();
            true
        });
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.update_selected("opacity", |object| {
            object.style.opacity = opacity;
            true
        });
    }

    fn update_selected_fonts(&mut self, label: &str, mut apply: impl FnMut(&mut FontSpec)) {
        self.update_selected(label, |object| match object.kind.font_mut() {
            Some(font) => {
                apply(font);
                true
            }
            None => false,
        });
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.defaults.font_family = family.to_string();
        let family = family.to_string();
        self.update_selected_fonts("font family", |font| font.family = family.clone());
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.update_selected_fonts("font size", |font| font.size = size);
    }

    pub fn set_font_weight(&mut self, weight: u16) {
        self.update_selected_fonts("font weight", |font| font.weight = weight);
    }

    pub fn set_font_style(&mut self, style: FontStyle) {
        self.update_selected_fonts("font style", |font| font.style = style);
    }

    pub fn set_font_underline(&mut self, underline: bool) {
        self.update_selected_fonts("underline", |font| font.underline = underline);
    }

    pub fn set_font_linethrough(&mut self, linethrough: bool) {
        self.update_selected_fonts("linethrough", |font| font.linethrough = linethrough);
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.update_selected_fonts("text align", |font| font.align = align);
    }

    /// Replace the content of the first selected text object.
    pub fn set_text_content(&mut self, content: &str) -> bool {
        let id = match self.selection.first() {
            Some(id) => *id,
            None => return false,
        };
        match self.scene.get_mut(id).map(|o| &mut o.kind) {
            Some(ObjectKind::Text { content: current, .. }) => {
                if current.as_str() != content {
                    *current = content.to_string();
                    self.record("edit text");
                }
                true
            }
            _ => false,
        }
    }

    /// Apply a pixel filter to every selected image.
    pub fn set_image_filter(&mut self, filter: ImageFilter) {
        self.update_selected("image filter", |object| match &mut object.kind {
            ObjectKind::Image { filter: current, .. } => {
                *current = filter;
                true
            }
            _ => false,
        });
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the first selected object into the clipboard slot.
    pub fn copy(&mut self) -> bool {
        let object = match self.selection.first().and_then(|id| self.scene.get(*id)) {
            Some(object) => object.clone(),
            None => return false,
        };
        self.clipboard.copy(&object);
        true
    }

    /// Paste the clipboard template as a fresh, offset, selected object.
    pub fn paste(&mut self) -> Option<ObjectId> {
        let object = self.clipboard.paste()?;
        let id = self.scene.add(object);
        self.select_only(id);
        self.record("paste");
        Some(id)
    }

    // ─── Free drawing ────────────────────────────────────────────────────

    /// Start a free-draw stroke at a world position.
    pub fn begin_draw(&mut self, x: f64, y: f64) {
        self.draw_stroke = Some(vec![(x, y)]);
    }

    /// Extend the active stroke. Ignored when no stroke is active.
    pub fn extend_draw(&mut self, x: f64, y: f64) {
        if let Some(points) = self.draw_stroke.as_mut() {
            points.push((x, y));
        }
    }

    /// Finish the stroke. Strokes with fewer than two points are dropped.
    /// Exactly one history entry per completed stroke.
    pub fn end_draw(&mut self) -> Option<ObjectId> {
        let points = self.draw_stroke.take()?;
        if points.len() < 2 {
            return None;
        }
        // Normalize to a local origin; the transform carries the position.
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let local: Vec<(f64, f64)> = points
            .iter()
            .map(|&(x, y)| (x - min_x, y - min_y))
            .collect();

        let mut style = self.object_style();
        style.fill = Color::TRANSPARENT;
        let object = SceneObject::new(
            ObjectKind::Path { points: local },
            Transform::at(min_x, min_y),
            style,
        );
        let id = self.scene.add(object);
        self.select_only(id);
        self.record("draw");
        Some(id)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        // In-flight loads must not resolve into a dead session.
        self.pending.invalidate_all();
    }
}
