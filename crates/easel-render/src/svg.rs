//! SVG export.
//!
//! Emits the scene cropped to workspace bounds with the viewport reset to
//! identity: the document's width/height/viewBox are the workspace's, the
//! workspace fill is the first element, and objects follow in z-order.
//! Content outside the workspace is clipped by the viewBox, matching the
//! editor's clip region.

use easel_core::model::{Color, FontStyle, ImageFilter, ObjectKind, TextAlign};
use easel_core::{Scene, SceneObject};

/// Render the scene to a standalone SVG document.
pub fn export_svg(scene: &Scene) -> String {
    let ws = &scene.workspace;
    log::trace!(
        "exporting {} objects over {}x{} workspace",
        scene.objects.len(),
        ws.width,
        ws.height
    );
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = ws.width,
        h = ws.height,
    ));
    svg.push_str(&format!(
        "<rect width=\"{}\" height=\"{}\" fill=\"{}\" />\n",
        ws.width,
        ws.height,
        color_attr(ws.fill),
    ));
    for object in &scene.objects {
        push_object(&mut svg, object);
    }
    svg.push_str("</svg>\n");
    svg
}

fn color_attr(c: Color) -> String {
    if c.a == 0.0 {
        "none".to_string()
    } else if c.is_opaque() {
        c.to_hex()
    } else {
        format!(
            "rgba({}, {}, {}, {})",
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            c.a,
        )
    }
}

/// The object's placement as an SVG transform chain: translate to position,
/// rotate/skew about the scaled box center, then scale intrinsic geometry.
fn transform_attr(object: &SceneObject) -> String {
    let t = &object.transform;
    let (w, h) = object.local_size();
    let mut parts = vec![format!("translate({} {})", t.x, t.y)];
    if t.rotation != 0.0 || t.skew_x != 0.0 || t.skew_y != 0.0 {
        let cx = w / 2.0;
        let cy = h / 2.0;
        parts.push(format!("translate({cx} {cy})"));
        if t.rotation != 0.0 {
            parts.push(format!("rotate({})", t.rotation));
        }
        if t.skew_x != 0.0 {
            parts.push(format!("skewX({})", t.skew_x));
        }
        if t.skew_y != 0.0 {
            parts.push(format!("skewY({})", t.skew_y));
        }
        parts.push(format!("translate({} {})", -cx, -cy));
    }
    if t.scale_x != 1.0 || t.scale_y != 1.0 {
        parts.push(format!("scale({} {})", t.scale_x, t.scale_y));
    }
    parts.join(" ")
}

fn style_attrs(object: &SceneObject, with_stroke: bool) -> String {
    let style = &object.style;
    let mut attrs = vec![format!("fill=\"{}\"", color_attr(style.fill))];
    if with_stroke && style.stroke_width > 0.0 && style.stroke.a > 0.0 {
        attrs.push(format!("stroke=\"{}\"", color_attr(style.stroke)));
        attrs.push(format!("stroke-width=\"{}\"", style.stroke_width));
        if !style.stroke_dash.is_empty() {
            let dash: Vec<String> = style.stroke_dash.iter().map(f64::to_string).collect();
            attrs.push(format!("stroke-dasharray=\"{}\"", dash.join(" ")));
        }
    }
    if style.opacity < 1.0 {
        attrs.push(format!("opacity=\"{}\"", style.opacity));
    }
    attrs.join(" ")
}

fn filter_attr(filter: ImageFilter) -> Option<&'static str> {
    match filter {
        ImageFilter::None => None,
        ImageFilter::Grayscale => Some("grayscale(100%)"),
        ImageFilter::Sepia => Some("sepia(100%)"),
        ImageFilter::Invert => Some("invert(100%)"),
        ImageFilter::Brightness => Some("brightness(140%)"),
        ImageFilter::Contrast => Some("contrast(140%)"),
        ImageFilter::Saturation => Some("saturate(180%)"),
        ImageFilter::Vintage => Some("sepia(40%) contrast(90%) brightness(110%)"),
        ImageFilter::Pixelate => Some("blur(1px)"),
        ImageFilter::Blur => Some("blur(6px)"),
        ImageFilter::BlackWhite => Some("grayscale(100%) contrast(160%)"),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn push_object(out: &mut String, object: &SceneObject) {
    let transform = transform_attr(object);
    match &object.kind {
        ObjectKind::Rect {
            width,
            height,
            corner_radius,
        } => {
            let radius = if *corner_radius > 0.0 {
                format!(" rx=\"{corner_radius}\" ry=\"{corner_radius}\"")
            } else {
                String::new()
            };
            out.push_str(&format!(
                "<rect width=\"{width}\" height=\"{height}\"{radius} transform=\"{transform}\" {} />\n",
                style_attrs(object, true),
            ));
        }
        ObjectKind::Circle { radius } => {
            out.push_str(&format!(
                "<circle cx=\"{radius}\" cy=\"{radius}\" r=\"{radius}\" transform=\"{transform}\" {} />\n",
                style_attrs(object, true),
            ));
        }
        ObjectKind::Triangle { width, height } => {
            out.push_str(&format!(
                "<polygon points=\"{},0 {},{} 0,{}\" transform=\"{transform}\" {} />\n",
                width / 2.0,
                width,
                height,
                height,
                style_attrs(object, true),
            ));
        }
        ObjectKind::Polygon { points } => {
            out.push_str(&format!(
                "<polygon points=\"{}\" transform=\"{transform}\" {} />\n",
                points_attr(points),
                style_attrs(object, true),
            ));
        }
        ObjectKind::Path { points } => {
            out.push_str(&format!(
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\" transform=\"{transform}\" />\n",
                points_attr(points),
                color_attr(object.style.stroke),
                object.style.stroke_width,
            ));
        }
        ObjectKind::Text { content, font } => {
            // Glyphs are filled only; stroke attributes don't apply to text.
            let anchor = match font.align {
                TextAlign::Left | TextAlign::Justify => "start",
                TextAlign::Center => "middle",
                TextAlign::Right => "end",
            };
            let (w, _) = object.kind.intrinsic_size();
            let x = match font.align {
                TextAlign::Left | TextAlign::Justify => 0.0,
                TextAlign::Center => w / 2.0,
                TextAlign::Right => w,
            };
            let mut decorations = Vec::new();
            if font.underline {
                decorations.push("underline");
            }
            if font.linethrough {
                decorations.push("line-through");
            }
            let decoration = if decorations.is_empty() {
                String::new()
            } else {
                format!(" text-decoration=\"{}\"", decorations.join(" "))
            };
            let font_style = match font.style {
                FontStyle::Normal => "",
                FontStyle::Italic => " font-style=\"italic\"",
            };
            let line_height = font.size * 1.16;
            for (i, line) in content.lines().enumerate() {
                let y = font.size * 0.85 + i as f64 * line_height;
                out.push_str(&format!(
                    "<text x=\"{x}\" y=\"{y}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\"{font_style}{decoration} text-anchor=\"{anchor}\" transform=\"{transform}\" {}>{}</text>\n",
                    escape_text(&font.family),
                    font.size,
                    font.weight,
                    style_attrs(object, false),
                    escape_text(line),
                ));
            }
        }
        ObjectKind::Image {
            src,
            width,
            height,
            filter,
        } => {
            let style = match filter_attr(*filter) {
                Some(css) => format!(" style=\"filter: {css}\""),
                None => String::new(),
            };
            let opacity = if object.style.opacity < 1.0 {
                format!(" opacity=\"{}\"", object.style.opacity)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "<image href=\"{}\" width=\"{width}\" height=\"{height}\"{style}{opacity} transform=\"{transform}\" preserveAspectRatio=\"none\" />\n",
                escape_text(src),
            ));
        }
    }
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::model::{FontSpec, ObjectStyle, Transform};

    #[test]
    fn export_crops_to_workspace() {
        let scene = Scene::new();
        let svg = export_svg(&scene);
        assert!(svg.contains("viewBox=\"0 0 900 1200\""));
        assert!(svg.contains("fill=\"#FFFFFF\""));
    }

    #[test]
    fn objects_appear_in_z_order() {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(
            ObjectKind::Rect {
                width: 10.0,
                height: 10.0,
                corner_radius: 0.0,
            },
            Transform::at(0.0, 0.0),
            ObjectStyle::default(),
        ));
        scene.add(SceneObject::new(
            ObjectKind::Circle { radius: 5.0 },
            Transform::at(0.0, 0.0),
            ObjectStyle::default(),
        ));

        let svg = export_svg(&scene);
        let rect_pos = svg.find("<rect width=\"10\"").unwrap();
        let circle_pos = svg.find("<circle").unwrap();
        assert!(rect_pos < circle_pos, "backmost object must come first");
    }

    #[test]
    fn text_is_escaped_and_decorated() {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(
            ObjectKind::Text {
                content: "a < b & c".into(),
                font: FontSpec {
                    underline: true,
                    ..FontSpec::default()
                },
            },
            Transform::at(0.0, 0.0),
            ObjectStyle::default(),
        ));

        let svg = export_svg(&scene);
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.contains("text-decoration=\"underline\""));
        // Text has no stroke, even though the style carries one.
        assert!(!svg.contains("<text x=\"0\" y=\"27.2\" font-family=\"Arial\" font-size=\"32\" font-weight=\"400\" stroke"));
    }

    #[test]
    fn image_filter_becomes_css() {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(
            ObjectKind::Image {
                src: "https://img.example/x.png".into(),
                width: 100.0,
                height: 100.0,
                filter: ImageFilter::Grayscale,
            },
            Transform::at(0.0, 0.0),
            ObjectStyle::default(),
        ));

        let svg = export_svg(&scene);
        assert!(svg.contains("filter: grayscale(100%)"));
    }

    #[test]
    fn rotation_lands_in_the_transform_chain() {
        let mut scene = Scene::new();
        let mut obj = SceneObject::new(
            ObjectKind::Rect {
                width: 100.0,
                height: 40.0,
                corner_radius: 0.0,
            },
            Transform::at(20.0, 30.0),
            ObjectStyle::default(),
        );
        obj.transform.rotation = 45.0;
        scene.add(obj);

        let svg = export_svg(&scene);
        assert!(svg.contains("translate(20 30) translate(50 20) rotate(45) translate(-50 -20)"));
    }
}
