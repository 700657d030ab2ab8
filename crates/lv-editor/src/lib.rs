//! Interaction engine for LV floor plans: tools, selection, undo history,
//! viewport transform and the editor controller that ties them together.

pub mod align;
pub mod config;
pub mod editor;
pub mod export;
pub mod fittings;
pub mod hit;
pub mod history;
pub mod input;
pub mod mutation;
pub mod selection;
pub mod sessions;
pub mod shortcuts;
pub mod tools;
pub mod viewport;

pub use align::{AlignMode, Axis};
pub use config::{DrawMode, EditorConfig, FixedDirection, LineSettings, ToolDefaults};
pub use editor::Editor;
pub use export::{CaptureSurface, ExportError, ExportFormat, ExportOutput, PdfWriter};
pub use input::{InputEvent, Modifiers, MouseButton};
pub use mutation::{LineRef, Mutation};
pub use selection::Selection;
pub use sessions::TabTarget;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
pub use viewport::Viewport;
