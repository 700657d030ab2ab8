pub mod background;
pub mod catalog;
pub mod document;
pub mod geometry;
pub mod id;
pub mod model;
pub mod numbering;
pub mod project;
pub mod scale;
pub mod store;

pub use background::{Background, BackgroundError, PdfRasterizer, Raster};
pub use catalog::{Category, ElementDef, LabelPreset};
pub use document::{CustomNames, Document, ElementPatch, NewElement, ProjectSummary};
pub use id::{DefId, Uid};
pub use model::*;
pub use numbering::{LabelCounters, NumberAllocator};
pub use project::{Project, ProjectError, ProjectFile, ProjectSettings};
pub use scale::{Scale, ScaleError, ScalePreset};
pub use store::EntityStore;

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Affine, Point, Rect, Size, Vec2};
