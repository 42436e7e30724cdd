//! Cursor resolution.
//!
//! A pure function of the active tool, pan mode, held keys and selection.
//! Precedence: an active pan, then a pending pan (Space or hand tool), then
//! a hovered resize handle, then the tool's own cursor.

use crate::transform::ResizeHandle;
use sf_core::{PanMode, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Move,
    Grab,
    Grabbing,
    Crosshair,
    Text,
    /// Eraser glyph; renders as `cell` where custom cursors are unavailable.
    Eraser,
    Resize(ResizeHandle),
}

impl Cursor {
    /// CSS `cursor` value.
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Move => "move",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
            Cursor::Text => "text",
            Cursor::Eraser => "cell",
            Cursor::Resize(handle) => handle.cursor_name(),
        }
    }
}

/// Everything cursor resolution depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorContext {
    pub tool: Tool,
    pub pan_mode: PanMode,
    /// Space held (temporary hand tool).
    pub space_held: bool,
    pub has_selection: bool,
    /// Handle under the pointer or being dragged.
    pub handle: Option<ResizeHandle>,
}

pub fn resolve_cursor(ctx: &CursorContext) -> Cursor {
    if ctx.pan_mode != PanMode::Idle {
        return Cursor::Grabbing;
    }
    if ctx.space_held || ctx.tool == Tool::Hand {
        return Cursor::Grab;
    }
    match ctx.tool {
        Tool::Select => match ctx.handle {
            Some(handle) if ctx.has_selection => Cursor::Resize(handle),
            _ if ctx.has_selection => Cursor::Move,
            _ => Cursor::Default,
        },
        Tool::Text => Cursor::Text,
        Tool::Eraser => Cursor::Eraser,
        Tool::Frame | Tool::Rect | Tool::Ellipse | Tool::Freedraw | Tool::Arrow | Tool::Line => {
            Cursor::Crosshair
        }
        Tool::Hand => Cursor::Grab,
    }
}
