//! Session-level behavior: persistence, viewport, clipboard, AI boundary.

use easel_core::model::{Color, ImageFilter, ObjectKind};
use easel_core::{MAX_ZOOM, MIN_ZOOM};
use easel_editor::{EditorSession, ImageServices, ShapeSpec};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn save_load_roundtrip_preserves_serialization() {
    init_logging();
    let mut session = EditorSession::new();
    session.add_shape(ShapeSpec::SoftRectangle);
    session.set_fill_color(Color::from_hex("#0984E3").unwrap());
    session.add_text("headline");
    session.set_font_weight(700);
    let saved = session.save_json().unwrap();

    let mut restored = EditorSession::new();
    restored.load_json(&saved).unwrap();
    assert_eq!(restored.save_json().unwrap(), saved);

    // Loading seeds history: the loaded state is the floor, not an edit.
    assert!(!restored.can_undo());
    assert!(!restored.can_redo());
}

#[test]
fn malformed_document_leaves_session_untouched() {
    init_logging();
    let mut session = EditorSession::new();
    session.add_shape(ShapeSpec::Circle);
    let before = session.save_json().unwrap();

    assert!(session.load_json("{\"workspace\":").is_err());
    assert!(session.load_json(r#"{"workspace":{"width":-5,"height":0,"fill":"red"},"objects":[]}"#).is_err());

    assert_eq!(session.save_json().unwrap(), before);
    assert!(session.can_undo());
}

#[test]
fn zoom_stays_inside_band() {
    init_logging();
    let mut session = EditorSession::new();
    session.set_container_size(1280.0, 800.0);

    for _ in 0..50 {
        session.zoom_in();
    }
    assert_eq!(session.viewport().zoom(), MAX_ZOOM);

    for _ in 0..50 {
        session.zoom_out();
    }
    assert_eq!(session.viewport().zoom(), MIN_ZOOM);

    session.auto_zoom();
    let z = session.viewport().zoom();
    assert!((MIN_ZOOM..=MAX_ZOOM).contains(&z));
}

#[test]
fn container_resize_refits_the_workspace() {
    init_logging();
    let mut session = EditorSession::new();
    session.set_container_size(1280.0, 800.0);
    let first = session.viewport().zoom();

    session.set_container_size(640.0, 400.0);
    let second = session.viewport().zoom();
    assert!(second < first);
}

#[test]
fn workspace_resize_is_undoable_and_refits() {
    init_logging();
    let mut session = EditorSession::new();
    session.set_container_size(1280.0, 800.0);
    let fitted = session.viewport().zoom();

    session.set_workspace_size(500.0, 500.0).unwrap();
    assert_ne!(session.viewport().zoom(), fitted);

    assert!(session.undo());
    assert_eq!(session.scene().workspace.width, 900.0);
    assert_eq!(session.scene().workspace.height, 1200.0);
}

#[test]
fn stale_image_token_after_load_is_ignored() {
    init_logging();
    let mut session = EditorSession::new();
    let empty = session.save_json().unwrap();
    let token = session.add_image("https://img.example/slow.png");

    // A document load arrives while the fetch is still in flight.
    session.load_json(&empty).unwrap();
    assert_eq!(session.finish_image_load(token, 500.0, 500.0), None);
    assert!(session.scene().objects.is_empty());
    assert_eq!(session.pending_image_loads(), 0);
}

#[test]
fn unknown_fonts_are_normalized_on_save() {
    init_logging();
    let mut session = EditorSession::new();
    session.set_font_family("Totally Made Up Sans");
    session.add_text("x");

    let saved = session.save_json().unwrap();
    assert!(saved.contains("\"family\":\"Arial\""));
    // The live scene still carries the requested family until persisted.
    let font = session.scene().objects[0].kind.font().unwrap();
    assert_eq!(font.family, "Totally Made Up Sans");
}

#[test]
fn select_all_and_escape() {
    init_logging();
    let mut session = EditorSession::new();
    session.add_shape(ShapeSpec::Rectangle);
    session.add_shape(ShapeSpec::Circle);
    session.add_shape(ShapeSpec::Triangle);

    session.select_all();
    assert_eq!(session.selected().len(), 3);

    session.clear_selection();
    assert!(session.selected().is_empty());
}

#[test]
fn reorder_keeps_workspace_at_back() {
    init_logging();
    let mut session = EditorSession::new();
    let a = session.add_shape(ShapeSpec::Rectangle);
    let b = session.add_shape(ShapeSpec::Circle);

    // a is backmost; sending it further back is a no-op.
    session.select(&[a]);
    assert!(!session.send_backward());
    assert_eq!(session.scene().index_of(a), Some(0));

    assert!(session.bring_forward());
    assert_eq!(session.scene().index_of(a), Some(1));
    assert_eq!(session.scene().index_of(b), Some(0));
}

struct CannedServices {
    fail: bool,
}

impl ImageServices for CannedServices {
    fn generate_image(&self, prompt: &str) -> Result<String, String> {
        if self.fail {
            Err("model unavailable".to_string())
        } else {
            Ok(format!("https://img.example/generated/{}.png", prompt.len()))
        }
    }

    fn remove_background(&self, image_url: &str) -> Result<String, String> {
        if self.fail {
            Err("remote error".to_string())
        } else {
            Ok(format!("{image_url}?bg=removed"))
        }
    }
}

#[test]
fn background_removal_swaps_source() {
    init_logging();
    let mut session = EditorSession::new();
    let token = session.add_image("https://img.example/dog.png");
    let id = session.finish_image_load(token, 600.0, 400.0).unwrap();

    let services = CannedServices { fail: false };
    assert_eq!(session.remove_selected_background(&services), Ok(id));

    match &session.scene().get(id).unwrap().kind {
        ObjectKind::Image { src, .. } => {
            assert_eq!(src, "https://img.example/dog.png?bg=removed");
        }
        other => panic!("expected image, got {other:?}"),
    }
    assert!(session.undo());
}

#[test]
fn background_removal_failure_is_inert() {
    init_logging();
    let mut session = EditorSession::new();
    let token = session.add_image("https://img.example/dog.png");
    session.finish_image_load(token, 600.0, 400.0).unwrap();
    let before = session.save_json().unwrap();

    let services = CannedServices { fail: true };
    assert!(session.remove_selected_background(&services).is_err());
    assert_eq!(session.save_json().unwrap(), before);
}

#[test]
fn background_removal_requires_an_image() {
    init_logging();
    let mut session = EditorSession::new();
    session.add_shape(ShapeSpec::Rectangle);
    let services = CannedServices { fail: false };
    assert!(session.remove_selected_background(&services).is_err());
}

#[test]
fn generated_image_flows_through_the_load_path() {
    init_logging();
    let services = CannedServices { fail: false };
    let url = services.generate_image("a fox").unwrap();

    let mut session = EditorSession::new();
    let token = session.add_image(&url);
    let id = session.finish_image_load(token, 1024.0, 1024.0).unwrap();
    match &session.scene().get(id).unwrap().kind {
        ObjectKind::Image { src, filter, .. } => {
            assert_eq!(src, &url);
            assert_eq!(*filter, ImageFilter::None);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn image_filter_applies_to_selected_images_only() {
    init_logging();
    let mut session = EditorSession::new();
    let token = session.add_image("https://img.example/a.png");
    let img = session.finish_image_load(token, 300.0, 300.0).unwrap();
    let rect = session.add_shape(ShapeSpec::Rectangle);

    session.select(&[img, rect]);
    session.set_image_filter(ImageFilter::Sepia);

    match &session.scene().get(img).unwrap().kind {
        ObjectKind::Image { filter, .. } => assert_eq!(*filter, ImageFilter::Sepia),
        other => panic!("expected image, got {other:?}"),
    }
}
