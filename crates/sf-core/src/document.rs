//! Canvas document codec and load-time validation.
//!
//! A `CanvasDocument` is the full persisted state: viewport plus shapes.
//! Everything read from disk, cache or a remote store passes through
//! [`CanvasDocument::validate`] before it may reach `ShapeAction::LoadProject`.

use crate::error::LoadError;
use crate::entity::{EntityState, Inconsistency};
use crate::model::{Shape, ShapeKind};
use crate::shapes::{LoadPayload, ShapesState, next_frame_number};
use crate::viewport::ViewportState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    pub viewport: ViewportState,
    pub shapes: ShapesState,
}

impl CanvasDocument {
    pub fn new(viewport: ViewportState, shapes: ShapesState) -> Self {
        Self { viewport, shapes }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate. Transient state (pan anchors, text edit) is
    /// dropped and stale selection entries are pruned.
    pub fn from_json(input: &str) -> Result<Self, LoadError> {
        let doc: CanvasDocument = serde_json::from_str(input)?;
        doc.into_validated()
    }

    /// Like [`from_json`](Self::from_json), but an invalid document yields
    /// an empty canvas together with the reason it was rejected.
    pub fn from_json_or_default(input: &str) -> (Self, Option<LoadError>) {
        match Self::from_json(input) {
            Ok(doc) => (doc, None),
            Err(e) => {
                log::warn!("sf_core::document: falling back to empty canvas: {e}");
                (Self::default(), Some(e))
            }
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        validate_viewport(&self.viewport)?;
        validate_shapes(&self.shapes.shapes)?;
        if self.shapes.frame_counter == u32::MAX {
            return Err(LoadError::FrameCounterExhausted);
        }
        let highest = self
            .shapes
            .shapes
            .iter()
            .filter_map(Shape::frame_number)
            .max();
        if let Some(highest) = highest
            && self.shapes.frame_counter <= highest
        {
            return Err(LoadError::FrameCounterBehind {
                counter: self.shapes.frame_counter,
                highest,
            });
        }
        Ok(())
    }

    /// Validate, then normalize the transient parts.
    pub fn into_validated(mut self) -> Result<Self, LoadError> {
        self.validate()?;
        self.viewport = self.viewport.settled();
        let shapes = &mut self.shapes;
        shapes.selected.retain(|id| shapes.shapes.contains(*id));
        shapes.editing_text_id = None;
        Ok(self)
    }

    /// Payload for `ShapeAction::LoadProject`.
    pub fn load_payload(&self) -> LoadPayload {
        LoadPayload {
            tool: self.shapes.tool,
            shapes: self.shapes.shapes.clone(),
            selected: self.shapes.selected.clone(),
            frame_counter: self.shapes.frame_counter,
        }
    }
}

fn validate_viewport(v: &ViewportState) -> Result<(), LoadError> {
    let bad = |msg: &str| Err(LoadError::InvalidViewport(msg.to_string()));
    if !(v.min_scale.is_finite() && v.max_scale.is_finite()) {
        return bad("scale bounds are not finite");
    }
    if v.min_scale <= 0.0 || v.min_scale > v.max_scale {
        return bad("scale bounds are inverted or non-positive");
    }
    if !v.scale.is_finite() || v.scale < v.min_scale || v.scale > v.max_scale {
        return bad("scale is outside its bounds");
    }
    if !v.translate.is_finite() {
        return bad("translate is not finite");
    }
    Ok(())
}

/// Structural checks on an entity table: order/map agreement, unique frame
/// numbers, then [`validate_shape`] on every entry.
pub fn validate_shapes(table: &EntityState<Shape>) -> Result<(), LoadError> {
    if let Some(problem) = table.find_inconsistency() {
        return Err(match problem {
            Inconsistency::DuplicateId(id) => LoadError::DuplicateId(id.to_string()),
            Inconsistency::OrphanId(id) => LoadError::OrphanId(id.to_string()),
            Inconsistency::KeyMismatch(key) => LoadError::KeyMismatch {
                key: key.to_string(),
                actual: table
                    .get(key)
                    .map(|s| s.id.to_string())
                    .unwrap_or_default(),
            },
            Inconsistency::UnorderedEntity(id) => LoadError::UnorderedEntity(id.to_string()),
        });
    }

    let mut numbers = HashSet::new();
    for shape in table.iter() {
        if let Some(n) = shape.frame_number()
            && !numbers.insert(n)
        {
            return Err(LoadError::DuplicateFrameNumber(n));
        }
        validate_shape(shape)?;
    }
    Ok(())
}

/// Checks that hold for a single shape wherever it comes from (storage,
/// import, clipboard): finite geometry, non-negative stroke width and box
/// size.
pub fn validate_shape(shape: &Shape) -> Result<(), LoadError> {
    if !shape.stroke_width.is_finite() || !geometry_is_finite(&shape.kind) {
        return Err(LoadError::NonFiniteGeometry(shape.id.to_string()));
    }
    if shape.stroke_width < 0.0 {
        return Err(LoadError::NegativeStrokeWidth(shape.id.to_string()));
    }
    if has_negative_size(&shape.kind) {
        return Err(LoadError::NegativeSize(shape.id.to_string()));
    }
    Ok(())
}

fn has_negative_size(kind: &ShapeKind) -> bool {
    match kind {
        ShapeKind::Frame { bounds, .. }
        | ShapeKind::Rect { bounds }
        | ShapeKind::Ellipse { bounds }
        | ShapeKind::GeneratedUi { bounds, .. } => bounds.w < 0.0 || bounds.h < 0.0,
        ShapeKind::Text { w, h, .. } => w.is_some_and(|w| w < 0.0) || h.is_some_and(|h| h < 0.0),
        ShapeKind::Freedraw { .. } | ShapeKind::Arrow { .. } | ShapeKind::Line { .. } => false,
    }
}

fn geometry_is_finite(kind: &ShapeKind) -> bool {
    match kind {
        ShapeKind::Frame { bounds, .. }
        | ShapeKind::Rect { bounds }
        | ShapeKind::Ellipse { bounds }
        | ShapeKind::GeneratedUi { bounds, .. } => bounds.is_finite(),
        ShapeKind::Freedraw { points } => points.iter().all(|p| p.is_finite()),
        ShapeKind::Arrow { start, end } | ShapeKind::Line { start, end } => {
            start.is_finite() && end.is_finite()
        }
        ShapeKind::Text {
            position,
            typography,
            w,
            h,
            ..
        } => {
            position.is_finite()
                && typography.font_size.is_finite()
                && typography.line_height.is_finite()
                && typography.letter_spacing.is_finite()
                && w.is_none_or(f64::is_finite)
                && h.is_none_or(f64::is_finite)
        }
    }
}

/// Smallest counter consistent with the shapes in `table`.
pub fn repaired_frame_counter(table: &EntityState<Shape>, stored: u32) -> u32 {
    stored.max(next_frame_number(table))
}
