//! Frame → generated UI hand-off.
//!
//! The generation workflow itself lives outside the core. This module builds
//! the request it consumes (frame id, contained shapes, their serialized
//! description) and the placeholder shape that later receives the payload.

use crate::geometry::Bounds;
use crate::id::ShapeId;
use crate::model::{Shape, ShapeKind, ShapeStyle};
use crate::shapes::ShapesState;
use serde::{Deserialize, Serialize};

/// Horizontal gap between a frame and its generated UI placeholder.
pub const PLACEHOLDER_GAP: f64 = 48.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub frame_id: ShapeId,
    pub frame_bounds: Bounds,
    /// Contained shapes in paint order.
    pub shape_ids: Vec<ShapeId>,
    /// The contained shapes themselves, in the persisted JSON form.
    pub shapes: Vec<Shape>,
}

impl GenerationRequest {
    /// Build a request for `frame_id`. `None` when the id is not a frame.
    pub fn for_frame(state: &ShapesState, frame_id: ShapeId) -> Option<Self> {
        let frame = state.get(frame_id).filter(|s| s.is_frame())?;
        let shape_ids = state.shapes_in_frame(frame_id);
        let shapes = shape_ids
            .iter()
            .filter_map(|id| state.get(*id).cloned())
            .collect();
        Some(Self {
            frame_id,
            frame_bounds: frame.bounds(),
            shape_ids,
            shapes,
        })
    }

    /// Serialized description of the contained shapes.
    pub fn describe(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.shapes)
    }
}

/// Empty generated-UI block placed to the right of its source frame.
pub fn placeholder_for(request: &GenerationRequest, style: &ShapeStyle) -> Shape {
    let b = request.frame_bounds;
    Shape::new(
        ShapeId::fresh(),
        style,
        ShapeKind::GeneratedUi {
            bounds: Bounds::new(b.right() + PLACEHOLDER_GAP, b.y, b.w, b.h),
            payload: String::new(),
            source_frame_id: request.frame_id,
        },
    )
}

/// True for a generated-UI block still waiting for its payload.
pub fn is_pending(shape: &Shape) -> bool {
    matches!(&shape.kind, ShapeKind::GeneratedUi { payload, .. } if payload.is_empty())
}
