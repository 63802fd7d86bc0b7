//! WASM bridge for Easel — exposes the editor session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and driven by the React
//! widget tree. All structured returns are JSON strings; the host parses
//! them and renders the scene itself (the session only owns state and
//! geometry). Raster export stays host-side: [`EaselCanvas::export_info`]
//! hands over the workspace crop so the host can render PNG/JPG with the
//! viewport reset to identity.

use easel_core::model::{Color, FontStyle, ImageFilter, TextAlign, Transform};
use easel_core::{ObjectId, Point, Rect};
use easel_editor::{EditorSession, ImageServices, LoadToken, ShapeSpec, ShortcutAction, ShortcutMap};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor handle.
///
/// Owns the session; everything the webview does goes through this struct.
#[wasm_bindgen]
pub struct EaselCanvas {
    session: EditorSession,
    /// In-flight image loads keyed by the serial handed to JS.
    loads: HashMap<u64, LoadToken>,
}

#[wasm_bindgen]
impl EaselCanvas {
    /// Create a session sized to the host container.
    #[wasm_bindgen(constructor)]
    pub fn new(container_width: f64, container_height: f64) -> Self {
        console_error_panic_hook_setup();
        let mut session = EditorSession::new();
        session.set_container_size(container_width, container_height);
        Self {
            session,
            loads: HashMap::new(),
        }
    }

    /// Report a container resize; the workspace is re-fitted.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.set_container_size(width, height);
    }

    // ─── Persistence & export ────────────────────────────────────────────

    /// Load a project document. Returns `{"ok":true}` or
    /// `{"ok":false,"error":"..."}`; on failure the scene is unchanged.
    pub fn load_json(&mut self, json: &str) -> String {
        match self.session.load_json(json) {
            Ok(()) => {
                self.loads.clear();
                r#"{"ok":true}"#.to_string()
            }
            Err(e) => error_json(&e),
        }
    }

    /// Serialize the project document, or an empty string on failure.
    pub fn save_json(&self) -> String {
        self.session.save_json().unwrap_or_else(|e| {
            log::error!("save failed: {e}");
            String::new()
        })
    }

    /// Standalone SVG of the workspace at identity transform.
    pub fn export_svg(&self) -> String {
        easel_render::export_svg(self.session.scene())
    }

    /// Workspace crop for host-side raster export:
    /// `{"width":..,"height":..,"fill":"#..."}`.
    pub fn export_info(&self) -> String {
        let ws = &self.session.scene().workspace;
        serde_json::json!({
            "width": ws.width,
            "height": ws.height,
            "fill": ws.fill.to_hex(),
        })
        .to_string()
    }

    /// Current objects in z-order, for the host renderer.
    pub fn get_objects_json(&self) -> String {
        serde_json::to_string(&self.session.scene().objects)
            .unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Object creation ─────────────────────────────────────────────────

    /// Add a shape preset by name. Returns the new object's id, or an
    /// empty string for an unknown preset.
    pub fn add_shape(&mut self, name: &str) -> String {
        let spec = match name {
            "rectangle" => ShapeSpec::Rectangle,
            "soft-rectangle" => ShapeSpec::SoftRectangle,
            "triangle" => ShapeSpec::Triangle,
            "inverted-triangle" => ShapeSpec::InvertedTriangle,
            "diamond" => ShapeSpec::Diamond,
            "circle" => ShapeSpec::Circle,
            _ => {
                log::warn!("unknown shape preset {name:?}");
                return String::new();
            }
        };
        self.session.add_shape(spec).to_string()
    }

    pub fn add_text(&mut self, content: &str) -> String {
        self.session.add_text(content).to_string()
    }

    /// Begin adding an image; the object appears once the host reports the
    /// load finished. Returns the load serial.
    pub fn add_image(&mut self, url: &str) -> f64 {
        let token = self.session.add_image(url);
        let serial = token.serial();
        self.loads.insert(serial, token);
        serial as f64
    }

    /// Complete an image load with decoded pixel dimensions. Returns the
    /// new object's id, or an empty string for stale loads.
    pub fn finish_image_load(&mut self, serial: f64, width: f64, height: f64) -> String {
        let Some(token) = self.loads.remove(&(serial as u64)) else {
            return String::new();
        };
        match self.session.finish_image_load(token, width, height) {
            Some(id) => id.to_string(),
            None => String::new(),
        }
    }

    /// Report a failed image fetch; the pending add is dropped.
    pub fn fail_image_load(&mut self, serial: f64) {
        if let Some(token) = self.loads.remove(&(serial as u64)) {
            self.session.fail_image_load(token);
        }
    }

    /// Swap the selected image's source for its background-removed copy.
    /// The host resolves the AI call first and passes the result URL in.
    pub fn apply_background_removal(&mut self, url: &str) -> bool {
        let resolved = ResolvedBackground {
            url: url.to_string(),
        };
        match self.session.remove_selected_background(&resolved) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("background removal not applied: {e}");
                false
            }
        }
    }

    // ─── Selection & hit testing ─────────────────────────────────────────

    /// Topmost object id at a screen position, or empty string.
    pub fn hit_test(&self, screen_x: f64, screen_y: f64) -> String {
        let world = self
            .session
            .viewport()
            .screen_to_world(Point::new(screen_x, screen_y));
        match easel_render::hit_test(self.session.scene(), world.x, world.y) {
            Some(id) => id.to_string(),
            None => String::new(),
        }
    }

    /// Object ids intersecting a screen-space marquee, as a JSON array.
    pub fn hit_test_rect(&self, x: f64, y: f64, width: f64, height: f64) -> String {
        let vp = self.session.viewport();
        let a = vp.screen_to_world(Point::new(x, y));
        let b = vp.screen_to_world(Point::new(x + width, y + height));
        let hits = easel_render::hit_test_rect(
            self.session.scene(),
            Rect::new(a.x, a.y, b.x, b.y),
        );
        let ids: Vec<String> = hits.iter().map(|id| id.to_string()).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Replace the selection with the given ids (JSON array of strings).
    pub fn select(&mut self, ids_json: &str) -> bool {
        let ids: Vec<String> = match serde_json::from_str(ids_json) {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("bad selection payload: {e}");
                return false;
            }
        };
        let ids: Vec<ObjectId> = ids.iter().map(|s| ObjectId::intern(s)).collect();
        self.session.select(&ids);
        true
    }

    pub fn select_all(&mut self) {
        self.session.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<String> = self
            .session
            .selected()
            .iter()
            .map(|id| id.to_string())
            .collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Style-panel snapshot for the current selection (or the session
    /// defaults when nothing is selected).
    pub fn get_active_style(&self) -> String {
        let view = self.session.active();
        serde_json::json!({
            "fillColor": view.fill_color().to_hex(),
            "strokeColor": view.stroke_color().to_hex(),
            "strokeWidth": view.stroke_width(),
            "strokeDash": view.stroke_dash().to_vec(),
            "opacity": view.opacity(),
            "fontFamily": view.font_family(),
            "fontSize": view.font_size(),
            "fontWeight": view.font_weight(),
            "fontStyle": match view.font_style() {
                FontStyle::Normal => "normal",
                FontStyle::Italic => "italic",
            },
            "underline": view.font_underline(),
            "linethrough": view.font_linethrough(),
            "textAlign": align_name(view.text_align()),
            "imageFilter": filter_name(view.image_filter()),
        })
        .to_string()
    }

    // ─── Mutators ────────────────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> usize {
        self.session.delete_selected()
    }

    pub fn bring_forward(&mut self) -> bool {
        self.session.bring_forward()
    }

    pub fn send_backward(&mut self) -> bool {
        self.session.send_backward()
    }

    pub fn set_fill_color(&mut self, hex: &str) -> bool {
        match Color::from_hex(hex) {
            Some(color) => {
                self.session.set_fill_color(color);
                true
            }
            None => false,
        }
    }

    pub fn set_stroke_color(&mut self, hex: &str) -> bool {
        match Color::from_hex(hex) {
            Some(color) => {
                self.session.set_stroke_color(color);
                true
            }
            None => false,
        }
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.session.set_stroke_width(width);
    }

    /// Dash pattern as a JSON array of numbers.
    pub fn set_stroke_dash(&mut self, dash_json: &str) -> bool {
        match serde_json::from_str::<Vec<f64>>(dash_json) {
            Ok(dash) => {
                self.session.set_stroke_dash(&dash);
                true
            }
            Err(e) => {
                log::warn!("bad dash payload: {e}");
                false
            }
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.session.set_opacity(opacity);
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.session.set_font_family(family);
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.session.set_font_size(size);
    }

    pub fn set_font_weight(&mut self, weight: u16) {
        self.session.set_font_weight(weight);
    }

    pub fn set_font_style(&mut self, style: &str) -> bool {
        let style = match style {
            "normal" => FontStyle::Normal,
            "italic" => FontStyle::Italic,
            _ => return false,
        };
        self.session.set_font_style(style);
        true
    }

    pub fn set_font_underline(&mut self, underline: bool) {
        self.session.set_font_underline(underline);
    }

    pub fn set_font_linethrough(&mut self, linethrough: bool) {
        self.session.set_font_linethrough(linethrough);
    }

    pub fn set_text_align(&mut self, align: &str) -> bool {
        let align = match align {
            "left" => TextAlign::Left,
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            "justify" => TextAlign::Justify,
            _ => return false,
        };
        self.session.set_text_align(align);
        true
    }

    pub fn set_text_content(&mut self, content: &str) -> bool {
        self.session.set_text_content(content)
    }

    pub fn set_image_filter(&mut self, name: &str) -> bool {
        match filter_from_name(name) {
            Some(filter) => {
                self.session.set_image_filter(filter);
                true
            }
            None => false,
        }
    }

    pub fn set_workspace_size(&mut self, width: f64, height: f64) -> String {
        match self.session.set_workspace_size(width, height) {
            Ok(()) => r#"{"ok":true}"#.to_string(),
            Err(e) => error_json(&e),
        }
    }

    pub fn set_workspace_fill(&mut self, hex: &str) -> bool {
        match Color::from_hex(hex) {
            Some(color) => {
                self.session.set_workspace_fill(color);
                true
            }
            None => false,
        }
    }

    // ─── Gestures (drag / resize / draw) ─────────────────────────────────

    pub fn begin_gesture(&mut self) {
        self.session.begin_gesture();
    }

    pub fn end_gesture(&mut self, label: &str) {
        self.session.end_gesture(label);
    }

    /// Move the selection by a screen-space delta.
    pub fn translate_selected(&mut self, screen_dx: f64, screen_dy: f64) -> bool {
        let zoom = self.session.viewport().zoom();
        self.session
            .translate_selected(screen_dx / zoom, screen_dy / zoom)
    }

    /// Replace one object's transform from a JSON payload
    /// (`{"x":..,"y":..,"scaleX":..,...}`).
    pub fn set_transform(&mut self, id: &str, transform_json: &str) -> bool {
        let transform: Transform = match serde_json::from_str(transform_json) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("bad transform payload: {e}");
                return false;
            }
        };
        self.session.set_transform(ObjectId::intern(id), transform)
    }

    pub fn begin_draw(&mut self, screen_x: f64, screen_y: f64) {
        let p = self
            .session
            .viewport()
            .screen_to_world(Point::new(screen_x, screen_y));
        self.session.begin_draw(p.x, p.y);
    }

    pub fn extend_draw(&mut self, screen_x: f64, screen_y: f64) {
        let p = self
            .session
            .viewport()
            .screen_to_world(Point::new(screen_x, screen_y));
        self.session.extend_draw(p.x, p.y);
    }

    /// Finish the stroke; returns the new object's id or empty string.
    pub fn end_draw(&mut self) -> String {
        match self.session.end_draw() {
            Some(id) => id.to_string(),
            None => String::new(),
        }
    }

    // ─── History & clipboard ─────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    pub fn copy(&mut self) -> bool {
        self.session.copy()
    }

    /// Returns the pasted object's id, or empty string.
    pub fn paste(&mut self) -> String {
        match self.session.paste() {
            Some(id) => id.to_string(),
            None => String::new(),
        }
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.session.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.session.zoom_out();
    }

    pub fn auto_zoom(&mut self) {
        self.session.auto_zoom();
    }

    pub fn get_zoom(&self) -> f64 {
        self.session.viewport().zoom()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and dispatch a keyboard event. Returns a JSON string
    /// `{"handled":bool,"action":"<name>"}`; the host calls
    /// `preventDefault` whenever `handled` is true.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let action = match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(action) => action,
            None => return r#"{"handled":false,"action":"none"}"#.to_string(),
        };
        let name = self.dispatch_action(action);
        format!(r#"{{"handled":true,"action":"{name}"}}"#)
    }

    fn dispatch_action(&mut self, action: ShortcutAction) -> &'static str {
        match action {
            ShortcutAction::Undo => {
                self.session.undo();
                "undo"
            }
            ShortcutAction::Redo => {
                self.session.redo();
                "redo"
            }
            ShortcutAction::Copy => {
                self.session.copy();
                "copy"
            }
            ShortcutAction::Paste => {
                self.session.paste();
                "paste"
            }
            ShortcutAction::Delete => {
                self.session.delete_selected();
                "delete"
            }
            ShortcutAction::SelectAll => {
                self.session.select_all();
                "selectAll"
            }
            ShortcutAction::Deselect => {
                self.session.clear_selection();
                "deselect"
            }
            // Saving is the host's job; it reads save_json on this signal.
            ShortcutAction::Save => "save",
            ShortcutAction::ZoomIn => {
                self.session.zoom_in();
                "zoomIn"
            }
            ShortcutAction::ZoomOut => {
                self.session.zoom_out();
                "zoomOut"
            }
            ShortcutAction::ZoomToFit => {
                self.session.auto_zoom();
                "zoomToFit"
            }
            ShortcutAction::BringForward => {
                self.session.bring_forward();
                "bringForward"
            }
            ShortcutAction::SendBackward => {
                self.session.send_backward();
                "sendBackward"
            }
        }
    }
}

/// Adapter: the host has already resolved the background-removal call, so
/// the collaborator just hands back the resulting URL.
struct ResolvedBackground {
    url: String,
}

impl ImageServices for ResolvedBackground {
    fn generate_image(&self, _prompt: &str) -> Result<String, String> {
        Err("generation is resolved by the host".to_string())
    }

    fn remove_background(&self, _image_url: &str) -> Result<String, String> {
        Ok(self.url.clone())
    }
}

fn error_json(message: &str) -> String {
    let escaped = message.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{{"ok":false,"error":"{escaped}"}}"#)
}

fn align_name(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
        TextAlign::Justify => "justify",
    }
}

fn filter_name(filter: ImageFilter) -> &'static str {
    match filter {
        ImageFilter::None => "none",
        ImageFilter::Grayscale => "grayscale",
        ImageFilter::Sepia => "sepia",
        ImageFilter::Invert => "invert",
        ImageFilter::Brightness => "brightness",
        ImageFilter::Contrast => "contrast",
        ImageFilter::Saturation => "saturation",
        ImageFilter::Vintage => "vintage",
        ImageFilter::Pixelate => "pixelate",
        ImageFilter::Blur => "blur",
        ImageFilter::BlackWhite => "blackwhite",
    }
}

fn filter_from_name(name: &str) -> Option<ImageFilter> {
    Some(match name {
        "none" => ImageFilter::None,
        "grayscale" => ImageFilter::Grayscale,
        "sepia" => ImageFilter::Sepia,
        "invert" => ImageFilter::Invert,
        "brightness" => ImageFilter::Brightness,
        "contrast" => ImageFilter::Contrast,
        "saturation" => ImageFilter::Saturation,
        "vintage" => ImageFilter::Vintage,
        "pixelate" => ImageFilter::Pixelate,
        "blur" => ImageFilter::Blur,
        "blackwhite" => ImageFilter::BlackWhite,
        _ => return None,
    })
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Easel WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
