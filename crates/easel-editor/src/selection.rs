//! Active-attribute resolution for the style panel.
//!
//! Getters follow one policy: empty selection yields the session default
//! for the attribute; otherwise the first selected object's value. An
//! attribute that is absent on the first object (font weight of a
//! rectangle) also falls back. Absence is modeled with `Option` — a real
//! `false`, `0.0`, or empty dash list is returned as-is, never mistaken
//! for "unset".

use easel_core::model::{Color, FontStyle, ImageFilter, ObjectKind, TextAlign};
use easel_core::{ObjectId, Scene, SceneObject};
use smallvec::SmallVec;

/// Session-level style state. New objects are built from these, and they
/// track the last explicitly chosen values so the panel shows something
/// sensible with nothing selected.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefaults {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub stroke_dash: SmallVec<[f64; 4]>,
    pub font_family: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: 2.0,
            stroke_dash: SmallVec::new(),
            font_family: "Arial".to_string(),
        }
    }
}

// Fixed fallbacks for attributes that are not session state.
pub const DEFAULT_FONT_SIZE: f64 = 32.0;
pub const DEFAULT_FONT_WEIGHT: u16 = 400;

/// Read-only view over the current selection.
pub struct SelectionView<'a> {
    scene: &'a Scene,
    selected: &'a [ObjectId],
    defaults: &'a StyleDefaults,
}

impl<'a> SelectionView<'a> {
    pub fn new(scene: &'a Scene, selected: &'a [ObjectId], defaults: &'a StyleDefaults) -> Self {
        Self {
            scene,
            selected,
            defaults,
        }
    }

    /// The first selected object, if any. Mixed multi-selections resolve to
    /// this object's values by policy.
    fn first(&self) -> Option<&'a SceneObject> {
        self.selected.first().and_then(|id| self.scene.get(*id))
    }

    pub fn fill_color(&self) -> Color {
        self.first().map_or(self.defaults.fill, |o| o.style.fill)
    }

    pub fn stroke_color(&self) -> Color {
        self.first().map_or(self.defaults.stroke, |o| o.style.stroke)
    }

    pub fn stroke_width(&self) -> f64 {
        self.first()
            .map_or(self.defaults.stroke_width, |o| o.style.stroke_width)
    }

    pub fn stroke_dash(&self) -> SmallVec<[f64; 4]> {
        self.first()
            .map_or_else(|| self.defaults.stroke_dash.clone(), |o| o.style.stroke_dash.clone())
    }

    pub fn opacity(&self) -> f64 {
        self.first().map_or(1.0, |o| o.style.opacity)
    }

    pub fn font_family(&self) -> String {
        match self.first().and_then(|o| o.kind.font()) {
            Some(font) => font.family.clone(),
            None => self.defaults.font_family.clone(),
        }
    }

    pub fn font_size(&self) -> f64 {
        self.first()
            .and_then(|o| o.kind.font())
            .map_or(DEFAULT_FONT_SIZE, |f| f.size)
    }

    pub fn font_weight(&self) -> u16 {
        self.first()
            .and_then(|o| o.kind.font())
            .map_or(DEFAULT_FONT_WEIGHT, |f| f.weight)
    }

    pub fn font_style(&self) -> FontStyle {
        self.first()
            .and_then(|o| o.kind.font())
            .map_or(FontStyle::Normal, |f| f.style)
    }

    pub fn font_underline(&self) -> bool {
        self.first()
            .and_then(|o| o.kind.font())
            .is_some_and(|f| f.underline)
    }

    pub fn font_linethrough(&self) -> bool {
        self.first()
            .and_then(|o| o.kind.font())
            .is_some_and(|f| f.linethrough)
    }

    pub fn text_align(&self) -> TextAlign {
        self.first()
            .and_then(|o| o.kind.font())
            .map_or(TextAlign::Left, |f| f.align)
    }

    pub fn image_filter(&self) -> ImageFilter {
        match self.first().map(|o| &o.kind) {
            Some(ObjectKind::Image { filter, .. }) => *filter,
            _ => ImageFilter::None,
        }
    }
}
