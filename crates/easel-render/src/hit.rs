//! Hit testing: world point → object lookup.
//!
//! Walks the object list front-to-back (reverse z-order) so the topmost
//! object wins. The workspace is background, not content: a point that
//! misses every object returns `None` even inside workspace bounds.

use easel_core::{ObjectId, Point, Rect, Scene};

/// Find the topmost object at a world position.
pub fn hit_test(scene: &Scene, x: f64, y: f64) -> Option<ObjectId> {
    let p = Point::new(x, y);
    scene
        .objects
        .iter()
        .rev()
        .find(|object| object.bounds().contains(p))
        .map(|object| object.id)
}

/// All objects whose bounds overlap the given rectangle, in z-order.
/// Used for marquee selection.
pub fn hit_test_rect(scene: &Scene, rect: Rect) -> Vec<ObjectId> {
    scene
        .objects
        .iter()
        .filter(|object| overlaps(object.bounds(), rect))
        .map(|object| object.id)
        .collect()
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}
