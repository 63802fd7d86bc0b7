//! The scene: one workspace rectangle plus a z-ordered object list.
//!
//! Insertion order is z-order (index 0 = backmost). The workspace is a
//! separate field rather than a list entry, so it can never participate in
//! z-order operations, selection, or deletion.

use crate::id::ObjectId;
use crate::model::{Color, SceneObject};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// The fixed background canvas-bounds rectangle. Exactly one per scene;
/// defines the exportable area and clip region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub width: f64,
    pub height: f64,
    pub fill: Color,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 1200.0,
            fill: Color::WHITE,
        }
    }
}

impl Workspace {
    /// Workspace rectangle in world coordinates (anchored at the origin).
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// The ordered collection of drawable objects plus the workspace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub workspace: Workspace,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Append an object at the top of the z-order.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Remove an object, returning it if present.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.index_of(id)?;
        Some(self.objects.remove(idx))
    }

    /// Move an object one step toward the front (swap with the next one).
    /// Returns true if the z-order changed.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx + 1 < self.objects.len() => {
                self.objects.swap(idx, idx + 1);
                true
            }
            _ => false,
        }
    }

    /// Move an object one step toward the back (swap with the previous one).
    /// The workspace sits structurally beneath index 0, so the floor here is
    /// still above it. Returns true if the z-order changed.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx > 0 => {
                self.objects.swap(idx, idx - 1);
                true
            }
            _ => false,
        }
    }

    /// Position an object so its box is centered within the workspace.
    pub fn center_in_workspace(&self, object: &mut SceneObject) {
        let (w, h) = object.local_size();
        object.transform.x = (self.workspace.width - w) / 2.0;
        object.transform.y = (self.workspace.height - h) / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectKind, ObjectStyle, Transform};
    use pretty_assertions::assert_eq;

    fn rect(w: f64, h: f64) -> SceneObject {
        SceneObject::new(
            ObjectKind::Rect {
                width: w,
                height: h,
                corner_radius: 0.0,
            },
            Transform::default(),
            ObjectStyle::default(),
        )
    }

    #[test]
    fn add_remove_lookup() {
        let mut scene = Scene::new();
        let id = scene.add(rect(10.0, 10.0));
        assert!(scene.contains(id));
        assert_eq!(scene.index_of(id), Some(0));

        let removed = scene.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!scene.contains(id));
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn z_order_steps_clamp_at_ends() {
        let mut scene = Scene::new();
        let a = scene.add(rect(1.0, 1.0));
        let b = scene.add(rect(2.0, 2.0));
        let c = scene.add(rect(3.0, 3.0));

        // a is backmost, cannot go further back
        assert!(!scene.send_backward(a));
        // c is frontmost, cannot go further forward
        assert!(!scene.bring_forward(c));

        assert!(scene.bring_forward(a));
        assert_eq!(scene.index_of(a), Some(1));
        assert_eq!(scene.index_of(b), Some(0));

        assert!(scene.send_backward(c));
        assert_eq!(scene.index_of(c), Some(1));
        assert_eq!(scene.index_of(a), Some(2));
    }

    #[test]
    fn centering_uses_scaled_size() {
        let scene = Scene::new();
        let mut obj = rect(400.0, 400.0);
        obj.transform.scale_x = 0.5;
        scene.center_in_workspace(&mut obj);
        assert_eq!(obj.transform.x, (900.0 - 200.0) / 2.0);
        assert_eq!(obj.transform.y, (1200.0 - 400.0) / 2.0);
    }
}
