//! Drawing tools.
//!
//! Each tool turns a pointer-down → move → up sequence (in world space)
//! into the geometry of one new shape. While drawing, `draft()` exposes a
//! preview that is never part of the entity table; the editor commits the
//! geometry returned from pointer-up.
//!
//! ## Modifier behaviors
//!
//! | Modifier  | Frame / Rect / Ellipse | Arrow / Line     | Freedraw | Text |
//! |-----------|------------------------|------------------|----------|------|
//! | **Shift** | Square constraint      | 45° angle snap   | —        | —    |

use crate::input::Modifiers;
use crate::transform::{snap_angle, square_corner};
use sf_core::geometry::{Bounds, Point};
use sf_core::model::{ShapeKind, TextStyle};
use sf_core::Tool;

/// Pointer phase within a drawing gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Down,
    Move,
    Up,
}

/// A pointer event already converted to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolEvent {
    pub phase: Phase,
    pub world: Point,
    pub modifiers: Modifiers,
}

impl ToolEvent {
    pub fn new(phase: Phase, world: Point, modifiers: Modifiers) -> Self {
        Self {
            phase,
            world,
            modifiers,
        }
    }
}

/// Trait for tools that draw a new shape.
pub trait DrawTool {
    fn kind(&self) -> Tool;

    /// Handle an input event. Returns the finished geometry on pointer-up,
    /// or `None` while drawing and for gestures too small to keep.
    fn handle(&mut self, event: &ToolEvent) -> Option<ShapeKind>;

    /// Geometry of the in-progress shape, for preview rendering.
    fn draft(&self) -> Option<ShapeKind>;

    /// Abandon the current gesture.
    fn cancel(&mut self);
}

/// Build the drawing tool for `tool`, or `None` for non-drawing tools.
pub fn drawing_tool(tool: Tool, min_size: f64, typography: &TextStyle) -> Option<Box<dyn DrawTool>> {
    let t: Box<dyn DrawTool> = match tool {
        Tool::Frame => Box::new(BoxTool::new(BoxKind::Frame, min_size)),
        Tool::Rect => Box::new(BoxTool::new(BoxKind::Rect, min_size)),
        Tool::Ellipse => Box::new(BoxTool::new(BoxKind::Ellipse, min_size)),
        Tool::Arrow => Box::new(SegmentTool::new(true, min_size)),
        Tool::Line => Box::new(SegmentTool::new(false, min_size)),
        Tool::Freedraw => Box::new(FreedrawTool::new()),
        Tool::Text => Box::new(TextTool::new(typography.clone())),
        Tool::Select | Tool::Hand | Tool::Eraser => return None,
    };
    Some(t)
}

// ─── Box Tool (frame, rect, ellipse) ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Frame,
    Rect,
    Ellipse,
}

pub struct BoxTool {
    box_kind: BoxKind,
    min_size: f64,
    start: Option<Point>,
    corner: Point,
}

impl BoxTool {
    pub fn new(box_kind: BoxKind, min_size: f64) -> Self {
        Self {
            box_kind,
            min_size,
            start: None,
            corner: Point::ORIGIN,
        }
    }

    fn geometry(&self, bounds: Bounds) -> ShapeKind {
        match self.box_kind {
            // The reducer assigns the real number on insert.
            BoxKind::Frame => ShapeKind::Frame {
                bounds,
                frame_number: 0,
            },
            BoxKind::Rect => ShapeKind::Rect { bounds },
            BoxKind::Ellipse => ShapeKind::Ellipse { bounds },
        }
    }
}

impl DrawTool for BoxTool {
    fn kind(&self) -> Tool {
        match self.box_kind {
            BoxKind::Frame => Tool::Frame,
            BoxKind::Rect => Tool::Rect,
            BoxKind::Ellipse => Tool::Ellipse,
        }
    }

    fn handle(&mut self, event: &ToolEvent) -> Option<ShapeKind> {
        match event.phase {
            Phase::Down => {
                self.start = Some(event.world);
                self.corner = event.world;
                None
            }
            Phase::Move | Phase::Up => {
                let start = self.start?;
                // Shift: constrain to square
                self.corner = if event.modifiers.shift {
                    square_corner(start, event.world)
                } else {
                    event.world
                };
                if event.phase == Phase::Move {
                    return None;
                }
                self.start = None;
                let bounds = Bounds::from_corners(start, self.corner);
                if bounds.w < self.min_size && bounds.h < self.min_size {
                    log::trace!("sf_editor::tools: discarding click-sized {:?}", self.box_kind);
                    return None;
                }
                Some(self.geometry(Bounds::new(
                    bounds.x,
                    bounds.y,
                    bounds.w.max(self.min_size),
                    bounds.h.max(self.min_size),
                )))
            }
        }
    }

    fn draft(&self) -> Option<ShapeKind> {
        let start = self.start?;
        Some(self.geometry(Bounds::from_corners(start, self.corner)))
    }

    fn cancel(&mut self) {
        self.start = None;
    }
}

// ─── Segment Tool (arrow, line) ──────────────────────────────────────────

pub struct SegmentTool {
    arrow: bool,
    min_len: f64,
    start: Option<Point>,
    end: Point,
}

impl SegmentTool {
    pub fn new(arrow: bool, min_len: f64) -> Self {
        Self {
            arrow,
            min_len,
            start: None,
            end: Point::ORIGIN,
        }
    }

    fn geometry(&self, start: Point, end: Point) -> ShapeKind {
        if self.arrow {
            ShapeKind::Arrow { start, end }
        } else {
            ShapeKind::Line { start, end }
        }
    }
}

impl DrawTool for SegmentTool {
    fn kind(&self) -> Tool {
        if self.arrow { Tool::Arrow } else { Tool::Line }
    }

    fn handle(&mut self, event: &ToolEvent) -> Option<ShapeKind> {
        match event.phase {
            Phase::Down => {
                self.start = Some(event.world);
                self.end = event.world;
                None
            }
            Phase::Move | Phase::Up => {
                let start = self.start?;
                // Shift: snap to 45° increments
                self.end = if event.modifiers.shift {
                    snap_angle(start, event.world)
                } else {
                    event.world
                };
                if event.phase == Phase::Move {
                    return None;
                }
                self.start = None;
                if start.distance_to(self.end) < self.min_len {
                    return None;
                }
                Some(self.geometry(start, self.end))
            }
        }
    }

    fn draft(&self) -> Option<ShapeKind> {
        self.start.map(|start| self.geometry(start, self.end))
    }

    fn cancel(&mut self) {
        self.start = None;
    }
}

// ─── Freedraw Tool ───────────────────────────────────────────────────────

pub struct FreedrawTool {
    drawing: bool,
    points: Vec<Point>,
}

impl Default for FreedrawTool {
    fn default() -> Self {
        Self::new()
    }
}

impl FreedrawTool {
    pub fn new() -> Self {
        Self {
            drawing: false,
            points: Vec::new(),
        }
    }

    fn push(&mut self, p: Point) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }
}

impl DrawTool for FreedrawTool {
    fn kind(&self) -> Tool {
        Tool::Freedraw
    }

    fn handle(&mut self, event: &ToolEvent) -> Option<ShapeKind> {
        match event.phase {
            Phase::Down => {
                self.drawing = true;
                self.points.clear();
                self.push(event.world);
                None
            }
            Phase::Move => {
                if self.drawing {
                    self.push(event.world);
                }
                None
            }
            Phase::Up => {
                if !self.drawing {
                    return None;
                }
                self.drawing = false;
                self.push(event.world);
                let points = std::mem::take(&mut self.points);
                // A click without movement leaves nothing visible.
                (points.len() >= 2).then_some(ShapeKind::Freedraw { points })
            }
        }
    }

    fn draft(&self) -> Option<ShapeKind> {
        self.drawing.then(|| ShapeKind::Freedraw {
            points: self.points.clone(),
        })
    }

    fn cancel(&mut self) {
        self.drawing = false;
        self.points.clear();
    }
}

// ─── Text Tool ───────────────────────────────────────────────────────────

/// Places an empty text shape where the pointer is released; the editor
/// then enters inline editing on it.
pub struct TextTool {
    typography: TextStyle,
    anchor: Option<Point>,
}

impl TextTool {
    pub fn new(typography: TextStyle) -> Self {
        Self {
            typography,
            anchor: None,
        }
    }
}

impl DrawTool for TextTool {
    fn kind(&self) -> Tool {
        Tool::Text
    }

    fn handle(&mut self, event: &ToolEvent) -> Option<ShapeKind> {
        match event.phase {
            Phase::Down => {
                self.anchor = Some(event.world);
                None
            }
            Phase::Move => None,
            Phase::Up => {
                let position = self.anchor.take()?;
                Some(ShapeKind::Text {
                    position,
                    text: String::new(),
                    typography: self.typography.clone(),
                    w: None,
                    h: None,
                })
            }
        }
    }

    fn draft(&self) -> Option<ShapeKind> {
        None
    }

    fn cancel(&mut self) {
        self.anchor = None;
    }
}
