pub mod document;
pub mod entity;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod history;
pub mod id;
pub mod model;
pub mod shapes;
pub mod viewport;

pub use document::{CanvasDocument, validate_shape, validate_shapes};
pub use entity::{Entity, EntityState, Inconsistency};
pub use error::LoadError;
pub use generation::GenerationRequest;
pub use geometry::{Bounds, Point, Size, screen_to_world, world_to_screen};
pub use history::{DEFAULT_MAX_HISTORY, History, HistoryEntry, snapshot};
pub use id::ShapeId;
pub use model::*;
pub use shapes::{LoadPayload, ShapeAction, ShapesState, next_frame_number};
pub use viewport::{PanMode, ViewportAction, ViewportConfig, ViewportState};
