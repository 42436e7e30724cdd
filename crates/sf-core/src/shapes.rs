//! Shapes state machine.
//!
//! `ShapesState::reduce` is a total function over `ShapeAction`: actions that
//! reference unknown ids, duplicate ids or inapplicable variants are no-ops,
//! never failures. Invariants kept by every transition:
//!
//! - `shapes.ids` and `shapes.entities` hold exactly the same ids;
//! - `selected ⊆ shapes`, pruned on every delete;
//! - `frame_counter` is the next frame number and only ever grows, except
//!   when a history snapshot or project payload replaces it wholesale.

use crate::entity::EntityState;
use crate::geometry::Bounds;
use crate::id::ShapeId;
use crate::model::{Shape, ShapeKind, ShapePatch, Tool};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// First number handed to a frame on an empty canvas.
pub const FIRST_FRAME_NUMBER: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapesState {
    pub tool: Tool,
    pub shapes: EntityState<Shape>,
    pub selected: BTreeSet<ShapeId>,
    pub frame_counter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing_text_id: Option<ShapeId>,
}

impl Default for ShapesState {
    fn default() -> Self {
        Self {
            tool: Tool::Select,
            shapes: EntityState::new(),
            selected: BTreeSet::new(),
            frame_counter: FIRST_FRAME_NUMBER,
            editing_text_id: None,
        }
    }
}

/// Wholesale replacement used by project restore.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadPayload {
    pub tool: Tool,
    pub shapes: EntityState<Shape>,
    pub selected: BTreeSet<ShapeId>,
    pub frame_counter: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeAction {
    SetTool(Tool),
    /// Insert on top. Frames get the next frame number.
    AddShape(Shape),
    /// Batch insert (paste / duplicate), in the given order.
    AddShapes(Vec<Shape>),
    UpdateShape {
        id: ShapeId,
        patch: ShapePatch,
    },
    DeleteShape(ShapeId),
    DeleteShapes(Vec<ShapeId>),
    SetSelection(Vec<ShapeId>),
    ToggleSelection(ShapeId),
    ClearSelection,
    SelectAll,
    BeginTextEdit(ShapeId),
    /// Leave inline text editing; an empty text shape is removed.
    EndTextEdit,
    BringToFront(Vec<ShapeId>),
    SendToBack(Vec<ShapeId>),
    BringForward(Vec<ShapeId>),
    SendBackward(Vec<ShapeId>),
    /// Remove every shape. The frame counter keeps counting.
    ClearCanvas,
    /// Trust boundary: the payload is expected to be validated already.
    LoadProject(LoadPayload),
    /// Undo/redo target: replaces shapes, selection and frame counter.
    Restore {
        shapes: EntityState<Shape>,
        selected: BTreeSet<ShapeId>,
        frame_counter: u32,
    },
}

impl ShapesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure transition function.
    pub fn reduce(mut self, action: ShapeAction) -> Self {
        match action {
            ShapeAction::SetTool(tool) => {
                if self.tool == Tool::Text && tool != Tool::Text {
                    self.editing_text_id = None;
                }
                self.tool = tool;
            }
            ShapeAction::AddShape(shape) => self.add_shape(shape),
            ShapeAction::AddShapes(shapes) => {
                for shape in shapes {
                    self.add_shape(shape);
                }
            }
            ShapeAction::UpdateShape { id, patch } => match self.shapes.get_mut(id) {
                Some(shape) => shape.apply_patch(&patch),
                None => log::debug!("updateShape: unknown id {id:?}"),
            },
            ShapeAction::DeleteShape(id) => self.delete(&[id]),
            ShapeAction::DeleteShapes(ids) => self.delete(&ids),
            ShapeAction::SetSelection(ids) => {
                self.selected = ids
                    .into_iter()
                    .filter(|id| self.shapes.contains(*id))
                    .collect();
            }
            ShapeAction::ToggleSelection(id) => {
                if !self.shapes.contains(id) {
                    log::debug!("toggleSelection: unknown id {id:?}");
                } else if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
            }
            ShapeAction::ClearSelection => self.selected.clear(),
            ShapeAction::SelectAll => self.selected = self.shapes.ids.iter().copied().collect(),
            ShapeAction::BeginTextEdit(id) => {
                if matches!(
                    self.shapes.get(id).map(|s| &s.kind),
                    Some(ShapeKind::Text { .. })
                ) {
                    self.editing_text_id = Some(id);
                }
            }
            ShapeAction::EndTextEdit => {
                if let Some(id) = self.editing_text_id.take() {
                    let blank = matches!(
                        self.shapes.get(id).map(|s| &s.kind),
                        Some(ShapeKind::Text { text, .. }) if text.trim().is_empty()
                    );
                    if blank {
                        self.delete(&[id]);
                    }
                }
            }
            ShapeAction::BringToFront(ids) => {
                self.shapes.bring_to_front(&id_set(&ids));
            }
            ShapeAction::SendToBack(ids) => {
                self.shapes.send_to_back(&id_set(&ids));
            }
            ShapeAction::BringForward(ids) => {
                self.shapes.bring_forward(&id_set(&ids));
            }
            ShapeAction::SendBackward(ids) => {
                self.shapes.send_backward(&id_set(&ids));
            }
            ShapeAction::ClearCanvas => {
                self.shapes.clear();
                self.selected.clear();
                self.editing_text_id = None;
            }
            ShapeAction::LoadProject(payload) => {
                self.tool = payload.tool;
                self.frame_counter = payload
                    .frame_counter
                    .max(next_frame_number(&payload.shapes));
                self.shapes = payload.shapes;
                self.selected = payload.selected;
                self.selected.retain(|id| self.shapes.contains(*id));
                self.editing_text_id = None;
            }
            ShapeAction::Restore {
                shapes,
                selected,
                frame_counter,
            } => {
                self.shapes = shapes;
                self.selected = selected;
                self.selected.retain(|id| self.shapes.contains(*id));
                self.frame_counter = frame_counter;
                if let Some(id) = self.editing_text_id
                    && !self.shapes.contains(id)
                {
                    self.editing_text_id = None;
                }
            }
        }
        self
    }

    fn add_shape(&mut self, mut shape: Shape) {
        if self.shapes.contains(shape.id) {
            log::debug!("addShape: duplicate id {:?} ignored", shape.id);
            return;
        }
        if let ShapeKind::Frame { frame_number, .. } = &mut shape.kind {
            let Some(next) = self.frame_counter.checked_add(1) else {
                log::warn!("addShape: frame counter exhausted, frame {:?} refused", shape.id);
                return;
            };
            *frame_number = self.frame_counter;
            self.frame_counter = next;
        }
        self.shapes.add_one(shape);
    }

    fn delete(&mut self, ids: &[ShapeId]) {
        if self.shapes.remove_many(ids) == 0 {
            return;
        }
        self.selected.retain(|id| self.shapes.contains(*id));
        if let Some(editing) = self.editing_text_id
            && !self.shapes.contains(editing)
        {
            self.editing_text_id = None;
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in paint order.
    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.shapes
            .ids
            .iter()
            .copied()
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    /// Selected shapes in paint order.
    pub fn selected_shapes(&self) -> Vec<&Shape> {
        self.shapes
            .iter()
            .filter(|s| self.selected.contains(&s.id))
            .collect()
    }

    pub fn selection_bounds(&self) -> Option<Bounds> {
        union_bounds(self.selected_shapes().into_iter())
    }

    /// Bounds of everything on the canvas.
    pub fn content_bounds(&self) -> Option<Bounds> {
        union_bounds(self.shapes.iter())
    }

    pub fn frames(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.iter().filter(|s| s.is_frame())
    }

    /// Shapes whose bounding box lies inside the frame's bounds, in paint
    /// order. Empty when `frame_id` is not a frame.
    pub fn shapes_in_frame(&self, frame_id: ShapeId) -> Vec<ShapeId> {
        let Some(frame) = self.shapes.get(frame_id).filter(|s| s.is_frame()) else {
            return Vec::new();
        };
        let area = frame.bounds();
        self.shapes
            .iter()
            .filter(|s| s.id != frame_id && area.contains_bounds(&s.bounds()))
            .map(|s| s.id)
            .collect()
    }

    /// Generated UI blocks produced from the given frame.
    pub fn generated_from(&self, frame_id: ShapeId) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .filter(|s| {
                matches!(s.kind, ShapeKind::GeneratedUi { source_frame_id, .. } if source_frame_id == frame_id)
            })
            .map(|s| s.id)
            .collect()
    }
}

/// `max(existing frame numbers) + 1`, or the first number for a canvas
/// without frames.
pub fn next_frame_number(shapes: &EntityState<Shape>) -> u32 {
    shapes
        .iter()
        .filter_map(Shape::frame_number)
        .max()
        .map_or(FIRST_FRAME_NUMBER, |n| n.saturating_add(1))
}

fn union_bounds<'a>(shapes: impl Iterator<Item = &'a Shape>) -> Option<Bounds> {
    shapes.map(Shape::bounds).reduce(|acc, b| acc.union(&b))
}

fn id_set(ids: &[ShapeId]) -> HashSet<ShapeId> {
    ids.iter().copied().collect()
}
