//! Portable document codec.
//!
//! A document is the JSON form of a [`Scene`]: workspace metadata plus the
//! object list, field names fixed by the serde derives on the model types.
//! Runtime-only state (selection, viewport, pending loads) is not part of
//! the model, so it can never leak into a saved document.
//!
//! Decoding builds a complete scene before the caller swaps it in — a
//! malformed document never leaves a half-reconstructed scene behind.

use crate::model::ObjectKind;
use crate::scene::Scene;

/// Font families the host is known to be able to load. Text objects are
/// normalized onto this list before persisting so a reopened document never
/// references a font that silently falls back at render time.
pub const FONT_FAMILIES: &[&str] = &[
    "Arial",
    "Arial Black",
    "Verdana",
    "Helvetica",
    "Tahoma",
    "Trebuchet MS",
    "Times New Roman",
    "Georgia",
    "Garamond",
    "Courier New",
    "Brush Script MT",
    "Palatino",
    "Bookman",
    "Comic Sans MS",
    "Impact",
    "Lucida Sans Unicode",
    "Geneva",
    "Lucida Console",
];

const FALLBACK_FAMILY: &str = "Arial";

/// Resolve a font-family reference to a loadable family name.
/// Matching is case-insensitive; unknown families fall back to Arial.
pub fn resolve_font_family(family: &str) -> &'static str {
    FONT_FAMILIES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(family.trim()))
        .copied()
        .unwrap_or(FALLBACK_FAMILY)
}

/// Rewrite every text object's font family onto the loadable list.
pub fn normalize_fonts(scene: &mut Scene) {
    for object in &mut scene.objects {
        if let Some(font) = object.kind.font_mut() {
            let resolved = resolve_font_family(&font.family);
            if font.family != resolved {
                log::debug!(
                    "normalizing font \"{}\" -> \"{resolved}\" on {}",
                    font.family,
                    object.id
                );
                font.family = resolved.to_string();
            }
        }
    }
}

/// Serialize a scene to its portable JSON document.
///
/// The scene itself is not mutated; font normalization happens on a copy.
pub fn to_json(scene: &Scene) -> Result<String, String> {
    let mut normalized = scene.clone();
    normalize_fonts(&mut normalized);
    serde_json::to_string(&normalized).map_err(|e| format!("serialize failed: {e}"))
}

/// Reconstruct a scene from a JSON document.
///
/// Validation rejects documents that would put the editor into a state it
/// cannot render or round-trip: non-finite numbers, a degenerate workspace,
/// or degenerate point lists. Opacity is clamped rather than rejected.
pub fn from_json(json: &str) -> Result<Scene, String> {
    let mut scene: Scene =
        serde_json::from_str(json).map_err(|e| format!("invalid document: {e}"))?;
    validate(&mut scene)?;
    Ok(scene)
}

fn validate(scene: &mut Scene) -> Result<(), String> {
    let ws = &scene.workspace;
    if !(ws.width.is_finite() && ws.height.is_finite()) || ws.width <= 0.0 || ws.height <= 0.0 {
        return Err(format!(
            "invalid workspace size {}x{}",
            ws.width, ws.height
        ));
    }

    for object in &mut scene.objects {
        let t = &object.transform;
        let finite = [t.x, t.y, t.scale_x, t.scale_y, t.rotation, t.skew_x, t.skew_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(format!("non-finite transform on object {}", object.id));
        }
        if !object.style.stroke_width.is_finite() || object.style.stroke_width < 0.0 {
            return Err(format!("invalid stroke width on object {}", object.id));
        }
        if !object.style.opacity.is_finite() {
            return Err(format!("non-finite opacity on object {}", object.id));
        }
        object.style.opacity = object.style.opacity.clamp(0.0, 1.0);

        match &object.kind {
            ObjectKind::Polygon { points } if points.len() < 3 => {
                return Err(format!("polygon {} has fewer than 3 points", object.id));
            }
            ObjectKind::Path { points } if points.len() < 2 => {
                return Err(format!("path {} has fewer than 2 points", object.id));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontSpec, ObjectKind, ObjectStyle, SceneObject, Transform};
    use pretty_assertions::assert_eq;

    fn text(content: &str, family: &str) -> SceneObject {
        SceneObject::new(
            ObjectKind::Text {
                content: content.into(),
                font: FontSpec {
                    family: family.into(),
                    ..FontSpec::default()
                },
            },
            Transform::at(100.0, 100.0),
            ObjectStyle::default(),
        )
    }

    #[test]
    fn roundtrip_is_idempotent() {
        let mut scene = Scene::new();
        scene.add(text("Hello", "Georgia"));
        scene.add(SceneObject::new(
            ObjectKind::Circle { radius: 225.0 },
            Transform::at(250.0, 400.0),
            ObjectStyle::default(),
        ));

        let first = to_json(&scene).unwrap();
        let reloaded = from_json(&first).unwrap();
        let second = to_json(&reloaded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_font_falls_back_to_arial() {
        let mut scene = Scene::new();
        scene.add(text("x", "Wingdings 3000"));
        let json = to_json(&scene).unwrap();
        let reloaded = from_json(&json).unwrap();
        let font = reloaded.objects[0].kind.font().unwrap();
        assert_eq!(font.family, "Arial");
    }

    #[test]
    fn font_match_is_case_insensitive() {
        assert_eq!(resolve_font_family("georgia"), "Georgia");
        assert_eq!(resolve_font_family("  COURIER NEW "), "Courier New");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(from_json("not json").is_err());
        assert!(from_json(r#"{"workspace": 3}"#).is_err());
    }

    #[test]
    fn degenerate_workspace_rejected() {
        let err = from_json(
            r##"{"workspace":{"width":0.0,"height":1200.0,"fill":"#FFFFFF"},"objects":[]}"##,
        )
        .unwrap_err();
        assert!(err.contains("workspace"), "{err}");
    }

    #[test]
    fn opacity_is_clamped_not_rejected() {
        let mut scene = Scene::new();
        let mut obj = text("x", "Arial");
        obj.style.opacity = 1.7;
        scene.add(obj);
        let reloaded = from_json(&to_json(&scene).unwrap()).unwrap();
        assert_eq!(reloaded.objects[0].style.opacity, 1.0);
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        // Older documents may omit skew/scale/dash fields entirely.
        let json = r##"{
            "workspace": {"width": 900.0, "height": 1200.0, "fill": "#FFFFFF"},
            "objects": [{
                "id": "rect_legacy",
                "type": "rect",
                "width": 100.0,
                "height": 80.0,
                "x": 10.0,
                "y": 20.0,
                "fill": "#FF0000",
                "stroke": "#000000",
                "strokeWidth": 2.0
            }]
        }"##;
        let scene = from_json(json).unwrap();
        let obj = &scene.objects[0];
        assert_eq!(obj.transform.scale_x, 1.0);
        assert_eq!(obj.transform.rotation, 0.0);
        assert_eq!(obj.style.opacity, 1.0);
        assert!(obj.style.stroke_dash.is_empty());
    }
}
