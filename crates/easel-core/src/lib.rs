pub mod document;
pub mod id;
pub mod model;
pub mod scene;
pub mod viewport;

pub use id::ObjectId;
pub use model::*;
pub use scene::{Scene, Workspace};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport, ZOOM_STEP};

// Re-export kurbo geometry types so downstream crates don't need a direct
// dependency for the common cases.
pub use kurbo::{Point, Rect};
