//! Core scene data model.
//!
//! A scene is a flat, z-ordered list of [`SceneObject`]s over a single
//! [`Workspace`](crate::scene::Workspace) rectangle. Every object carries a
//! tagged [`ObjectKind`] discriminant; kind-specific behavior (text has no
//! stroke, images carry a filter) is matched exhaustively on that tag.

use crate::id::ObjectId;
use kurbo::{Affine, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], persisted as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();

        let wide = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_digit(hi)? << 4 | hex_digit(lo)?) as f32 / 255.0)
        };
        let narrow = |d: u8| -> Option<f32> { Some((hex_digit(d)? * 17) as f32 / 255.0) };

        match bytes.len() {
            3 => Some(Self::rgba(
                narrow(bytes[0])?,
                narrow(bytes[1])?,
                narrow(bytes[2])?,
                1.0,
            )),
            4 => Some(Self::rgba(
                narrow(bytes[0])?,
                narrow(bytes[1])?,
                narrow(bytes[2])?,
                narrow(bytes[3])?,
            )),
            6 => Some(Self::rgba(
                wide(bytes[0], bytes[1])?,
                wide(bytes[2], bytes[3])?,
                wide(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                wide(bytes[0], bytes[1])?,
                wide(bytes[2], bytes[3])?,
                wide(bytes[4], bytes[5])?,
                wide(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Emit as uppercase hex, `#RRGGBB` for opaque colors, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    pub fn is_opaque(&self) -> bool {
        (self.a - 1.0).abs() < f32::EPSILON
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color \"{s}\"")))
    }
}

// ─── Transform ───────────────────────────────────────────────────────────

fn one() -> f64 {
    1.0
}

/// Object placement: `(x, y)` is the top-left corner of the unrotated,
/// scaled box in world coordinates; rotation and skew apply about the
/// box center. Angles are degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub skew_x: f64,
    #[serde(default)]
    pub skew_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
        }
    }
}

impl Transform {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// Shared visual attributes. Text objects ignore `stroke`/`stroke_width`
/// entirely (the glyphs are filled only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_dash: SmallVec<[f64; 4]>,
    #[serde(default = "one")]
    pub opacity: f64,
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: 2.0,
            stroke_dash: SmallVec::new(),
            opacity: 1.0,
        }
    }
}

// ─── Font / Text ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub weight: u16, // 100..900
    #[serde(default)]
    pub style: FontStyle,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub linethrough: bool,
    #[serde(default)]
    pub align: TextAlign,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".into(),
            size: 32.0,
            weight: 400,
            style: FontStyle::Normal,
            underline: false,
            linethrough: false,
            align: TextAlign::Left,
        }
    }
}

// ─── Image filters ───────────────────────────────────────────────────────

/// Pixel filter applied to an image object by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFilter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Invert,
    Brightness,
    Contrast,
    Saturation,
    Vintage,
    Pixelate,
    Blur,
    BlackWhite,
}

// ─── Object kinds ────────────────────────────────────────────────────────

/// The geometric kind of a scene object.
///
/// `Polygon` and `Path` points are kind-local coordinates anchored at the
/// origin; builders normalize them so the minimum corner is `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ObjectKind {
    Rect {
        width: f64,
        height: f64,
        #[serde(default)]
        corner_radius: f64,
    },
    Circle {
        radius: f64,
    },
    Triangle {
        width: f64,
        height: f64,
    },
    Polygon {
        points: Vec<(f64, f64)>,
    },
    Text {
        content: String,
        #[serde(default)]
        font: FontSpec,
    },
    Image {
        src: String,
        width: f64,
        height: f64,
        #[serde(default)]
        filter: ImageFilter,
    },
    Path {
        points: Vec<(f64, f64)>,
    },
}

impl ObjectKind {
    /// Prefix used when generating IDs for objects of this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Circle { .. } => "circle",
            ObjectKind::Triangle { .. } => "triangle",
            ObjectKind::Polygon { .. } => "polygon",
            ObjectKind::Text { .. } => "text",
            ObjectKind::Image { .. } => "image",
            ObjectKind::Path { .. } => "path",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ObjectKind::Text { .. })
    }

    pub fn font(&self) -> Option<&FontSpec> {
        match self {
            ObjectKind::Text { font, .. } => Some(font),
            _ => None,
        }
    }

    pub fn font_mut(&mut self) -> Option<&mut FontSpec> {
        match self {
            ObjectKind::Text { font, .. } => Some(font),
            _ => None,
        }
    }

    /// Unscaled size of the object's local bounding box.
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            ObjectKind::Rect { width, height, .. } => (*width, *height),
            ObjectKind::Circle { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Triangle { width, height } => (*width, *height),
            ObjectKind::Polygon { points } | ObjectKind::Path { points } => points_extent(points),
            ObjectKind::Text { content, font } => {
                // Rough estimate: real metrics come from the host's text
                // layout; only centering and hit targets use this.
                let longest = content.lines().map(str::len).max().unwrap_or(0);
                let lines = content.lines().count().max(1);
                (
                    longest as f64 * font.size * 0.6,
                    lines as f64 * font.size * 1.16,
                )
            }
            ObjectKind::Image { width, height, .. } => (*width, *height),
        }
    }
}

fn points_extent(points: &[(f64, f64)]) -> (f64, f64) {
    let mut max_x = 0.0f64;
    let mut max_y = 0.0f64;
    for &(x, y) in points {
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    (max_x, max_y)
}

// ─── Scene object ────────────────────────────────────────────────────────

/// A single drawable unit.
///
/// Serializes flat: one JSON object carrying the id, transform and style
/// fields, and the kind tag with its fields. The kind is declared last so
/// its tagged-enum decoding only sees the keys the structs before it left
/// unconsumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(flatten)]
    pub style: ObjectStyle,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Create an object of `kind` with a freshly generated ID.
    pub fn new(kind: ObjectKind, transform: Transform, style: ObjectStyle) -> Self {
        Self {
            id: ObjectId::with_prefix(kind.id_prefix()),
            kind,
            transform,
            style,
        }
    }

    /// Scaled (but unrotated) size of the object's box.
    pub fn local_size(&self) -> (f64, f64) {
        let (w, h) = self.kind.intrinsic_size();
        (w * self.transform.scale_x, h * self.transform.scale_y)
    }

    /// World-space axis-aligned bounding box, rotation and skew applied
    /// about the box center.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.local_size();
        let t = &self.transform;
        let local = Rect::new(t.x, t.y, t.x + w, t.y + h);
        if t.rotation == 0.0 && t.skew_x == 0.0 && t.skew_y == 0.0 {
            return local;
        }
        let center = local.center().to_vec2();
        let affine = Affine::translate(center)
            * Affine::rotate(t.rotation.to_radians())
            * Affine::skew(t.skew_x.to_radians().tan(), t.skew_y.to_radians().tan())
            * Affine::translate(-center);
        affine.transform_rect_bbox(local)
    }
}
