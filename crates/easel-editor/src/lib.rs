pub mod ai;
pub mod clipboard;
pub mod history;
pub mod loader;
pub mod selection;
pub mod session;
pub mod shortcuts;

pub use ai::ImageServices;
pub use history::{DEFAULT_DEPTH, History};
pub use loader::LoadToken;
pub use selection::{SelectionView, StyleDefaults};
pub use session::{EditorSession, ShapeSpec};
pub use shortcuts::{ShortcutAction, ShortcutMap};
