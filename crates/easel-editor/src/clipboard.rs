//! Single-slot clipboard with paste fan-out.

use easel_core::{ObjectId, SceneObject};

/// Offset applied per paste so repeated pastes fan out instead of stacking.
pub const PASTE_OFFSET: f64 = 10.0;

/// Holds at most one copied object template.
#[derive(Debug, Default)]
pub struct Clipboard {
    template: Option<SceneObject>,
    paste_count: u32,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_none()
    }

    /// Store a deep clone of `object` and reset the paste offset.
    pub fn copy(&mut self, object: &SceneObject) {
        self.template = Some(object.clone());
        self.paste_count = 0;
    }

    /// Instantiate the stored template with a fresh ID, offset by one more
    /// step than the previous paste. `None` when the slot is empty.
    pub fn paste(&mut self) -> Option<SceneObject> {
        let template = self.template.as_ref()?;
        self.paste_count += 1;
        let offset = PASTE_OFFSET * f64::from(self.paste_count);

        let mut object = template.clone();
        object.id = ObjectId::with_prefix(object.kind.id_prefix());
        object.transform.x += offset;
        object.transform.y += offset;
        Some(object)
    }
}
