//! The canvas editor controller.
//!
//! Holds the viewport, shapes state, history and the in-flight gesture. All
//! interaction from the host goes through [`Editor::handle_event`] or the
//! command methods; every change is expressed as a reducer action.
//!
//! History is recorded once per discrete edit: a committed drawing, a
//! released drag or resize, an eraser stroke, a delete, a paste. Intermediate
//! pointer moves update the live state only.

use crate::cursor::{Cursor, CursorContext, resolve_cursor};
use crate::hit::{hit_test, hit_test_rect, shapes_under};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{DrawTool, Phase, ToolEvent, drawing_tool};
use crate::transform::{ResizeHandle, constrain_axis, handle_at, resize_bounds};
use sf_core::generation::{GenerationRequest, is_pending, placeholder_for};
use sf_core::geometry::{Bounds, Point, Size};
use sf_core::model::{Shape, ShapeKind, ShapePatch, ShapeStyle, TextStyle};
use sf_core::{
    CanvasDocument, History, LoadError, PanMode, ShapeAction, ShapeId, ShapesState, Tool,
    ViewportAction, ViewportConfig, ViewportState, snapshot, validate_shape,
};
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Editor tunables. Pixel values are screen-space and divided by the
/// viewport scale before use.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub viewport: ViewportConfig,
    pub history_limit: usize,
    /// Hit-test slop around shapes, in pixels.
    pub hit_tolerance: f64,
    /// Side of the square resize handles, in pixels.
    pub handle_size: f64,
    /// Smallest width/height a drawn or resized box may have, in world units.
    pub min_shape_size: f64,
    /// Stroke/fill given to new shapes.
    pub style: ShapeStyle,
    pub typography: TextStyle,
    /// World offset applied per paste/duplicate.
    pub paste_offset: f64,
    pub screen: Size,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            history_limit: sf_core::DEFAULT_MAX_HISTORY,
            hit_tolerance: 4.0,
            handle_size: 8.0,
            min_shape_size: 1.0,
            style: ShapeStyle::default(),
            typography: TextStyle::default(),
            paste_offset: 16.0,
            screen: Size::default(),
        }
    }
}

/// What an input event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Something visible changed and a re-render is due.
    pub changed: bool,
    /// A history entry was recorded (or undone/redone).
    pub committed: bool,
    /// The active tool changed.
    pub tool_switched: bool,
}

impl EventOutcome {
    const NONE: EventOutcome = EventOutcome {
        changed: false,
        committed: false,
        tool_switched: false,
    };

    const CHANGED: EventOutcome = EventOutcome {
        changed: true,
        committed: false,
        tool_switched: false,
    };

    const COMMITTED: EventOutcome = EventOutcome {
        changed: true,
        committed: true,
        tool_switched: false,
    };

    fn from_commit(committed: bool) -> Self {
        if committed { Self::COMMITTED } else { Self::NONE }
    }

    fn from_change(changed: bool) -> Self {
        if changed { Self::CHANGED } else { Self::NONE }
    }
}

/// Transient gesture bookkeeping between pointer-down and pointer-up.
enum Gesture {
    Idle,
    Pan {
        mode: PanMode,
        origin: Point,
    },
    Draw(Box<dyn DrawTool>),
    Drag {
        origin: Point,
        originals: Vec<Shape>,
        moved: bool,
        /// Shift-press on a selected shape: deselect it if the pointer is
        /// released without moving.
        toggle_on_click: Option<ShapeId>,
    },
    Resize {
        handle: ResizeHandle,
        group: Bounds,
        originals: Vec<Shape>,
        resized: bool,
    },
    Marquee {
        start: Point,
        current: Point,
        additive: bool,
        base: BTreeSet<ShapeId>,
    },
    Erase {
        erased: SmallVec<[ShapeId; 8]>,
    },
}

pub struct Editor {
    config: EditorConfig,
    viewport: ViewportState,
    shapes: ShapesState,
    history: History,
    screen: Size,
    gesture: Gesture,
    space_held: bool,
    hover_handle: Option<ResizeHandle>,
    clipboard: Vec<Shape>,
    paste_count: u32,
    /// Bumped on every shapes/viewport change; hosts persist when it moves.
    revision: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let shapes = ShapesState::new();
        let mut history = History::new(config.history_limit);
        history.reset(snapshot(&shapes));
        Self {
            viewport: ViewportState::new(&config.viewport),
            screen: config.screen,
            config,
            shapes,
            history,
            gesture: Gesture::Idle,
            space_held: false,
            hover_handle: None,
            clipboard: Vec::new(),
            paste_count: 0,
            revision: 0,
        }
    }

    pub fn with_document(config: EditorConfig, doc: CanvasDocument) -> Self {
        let mut editor = Self::new(config);
        editor.load_document(doc);
        editor
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn shapes(&self) -> &ShapesState {
        &self.shapes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tool(&self) -> Tool {
        self.shapes.tool
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.shapes.selected_ids()
    }

    /// Preview geometry of the shape being drawn, if any.
    pub fn draft(&self) -> Option<ShapeKind> {
        match &self.gesture {
            Gesture::Draw(tool) => tool.draft(),
            _ => None,
        }
    }

    /// World-space rubber band, while one is being dragged.
    pub fn marquee(&self) -> Option<Bounds> {
        match &self.gesture {
            Gesture::Marquee { start, current, .. } => Some(Bounds::from_corners(*start, *current)),
            _ => None,
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub fn cursor(&self) -> Cursor {
        let handle = match &self.gesture {
            Gesture::Resize { handle, .. } => Some(*handle),
            _ => self.hover_handle,
        };
        resolve_cursor(&CursorContext {
            tool: self.shapes.tool,
            pan_mode: self.viewport.mode,
            space_held: self.space_held,
            has_selection: !self.shapes.selected.is_empty(),
            handle,
        })
    }

    /// Ids of the shapes lying inside a frame, for the generation workflow.
    pub fn shapes_in_frame(&self, frame_id: ShapeId) -> Vec<ShapeId> {
        self.shapes.shapes_in_frame(frame_id)
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Current state in persisted form. In-flight pans are dropped.
    pub fn document(&self) -> CanvasDocument {
        CanvasDocument::new(self.viewport.settled(), self.shapes.clone())
    }

    /// Replace everything with `doc` and start a fresh history.
    ///
    /// `doc` must already be validated (see `CanvasDocument::from_json`).
    pub fn load_document(&mut self, doc: CanvasDocument) {
        self.gesture = Gesture::Idle;
        self.hover_handle = None;
        self.apply_view(ViewportAction::Restore(doc.viewport.settled()));
        self.apply(ShapeAction::LoadProject(doc.load_payload()));
        self.history.reset(snapshot(&self.shapes));
        log::debug!(
            "sf_editor::editor: loaded {} shapes, next frame {}",
            self.shapes.shapes.len(),
            self.shapes.frame_counter
        );
    }

    pub fn set_screen_size(&mut self, screen: Size) {
        self.screen = screen;
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(*x, *y), *button, *modifiers),
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerUp { x, y, modifiers } => {
                self.pointer_up(Point::new(*x, *y), *modifiers)
            }
            InputEvent::DoubleClick { x, y, .. } => self.double_click(Point::new(*x, *y)),
            InputEvent::Wheel {
                dx,
                dy,
                x,
                y,
                modifiers,
            } => self.wheel(*dx, *dy, Point::new(*x, *y), *modifiers),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, *modifiers),
            InputEvent::KeyUp { key, .. } => self.key_up(key),
        }
    }

    fn pointer_down(&mut self, screen: Point, button: PointerButton, mods: Modifiers) -> EventOutcome {
        if self.is_gesture_active() {
            return EventOutcome::NONE;
        }
        if self.shapes.editing_text_id.is_some() {
            // Clicking away commits the text being edited.
            let mut outcome = EventOutcome::from_commit(self.commit_text_edit());
            outcome.changed = true;
            return outcome;
        }

        if button == PointerButton::Middle || self.space_held || self.shapes.tool == Tool::Hand {
            let (mode, action) = if mods.shift {
                (PanMode::ShiftPanning, ViewportAction::BeginShiftPan { screen })
            } else {
                (PanMode::Panning, ViewportAction::BeginPan { screen })
            };
            self.apply_view(action);
            self.gesture = Gesture::Pan {
                mode,
                origin: screen,
            };
            return EventOutcome::CHANGED;
        }
        if button != PointerButton::Primary {
            return EventOutcome::NONE;
        }

        let world = self.viewport.screen_to_world(screen);
        match self.shapes.tool {
            Tool::Select => self.select_down(world, mods),
            Tool::Eraser => {
                self.gesture = Gesture::Erase {
                    erased: SmallVec::new(),
                };
                self.erase_at(world)
            }
            Tool::Text => {
                if let Some(id) = self.hit(world)
                    && self.begin_text_edit(id)
                {
                    return EventOutcome::CHANGED;
                }
                self.start_drawing(world, mods)
            }
            _ => self.start_drawing(world, mods),
        }
    }

    fn start_drawing(&mut self, world: Point, mods: Modifiers) -> EventOutcome {
        let Some(mut tool) =
            drawing_tool(self.shapes.tool, self.config.min_shape_size, &self.config.typography)
        else {
            return EventOutcome::NONE;
        };
        tool.handle(&ToolEvent::new(Phase::Down, world, mods));
        self.gesture = Gesture::Draw(tool);
        EventOutcome::CHANGED
    }

    fn select_down(&mut self, world: Point, mods: Modifiers) -> EventOutcome {
        let handle_size = self.config.handle_size / self.viewport.scale;
        if !mods.shift
            && let Some(group) = self.shapes.selection_bounds()
            && let Some(handle) = handle_at(&group, world, handle_size)
        {
            self.gesture = Gesture::Resize {
                handle,
                group,
                originals: self.selected_clones(),
                resized: false,
            };
            return EventOutcome::CHANGED;
        }

        match self.hit(world) {
            Some(id) => {
                let already = self.shapes.is_selected(id);
                if mods.shift && !already {
                    self.apply(ShapeAction::ToggleSelection(id));
                } else if !already {
                    self.apply(ShapeAction::SetSelection(vec![id]));
                }
                // Clicking an already-selected shape keeps the group for dragging.
                self.gesture = Gesture::Drag {
                    origin: world,
                    originals: self.selected_clones(),
                    moved: false,
                    toggle_on_click: (mods.shift && already).then_some(id),
                };
            }
            None => {
                let base = if mods.shift {
                    self.shapes.selected.clone()
                } else {
                    self.apply(ShapeAction::ClearSelection);
                    BTreeSet::new()
                };
                self.gesture = Gesture::Marquee {
                    start: world,
                    current: world,
                    additive: mods.shift,
                    base,
                };
            }
        }
        EventOutcome::CHANGED
    }

    fn pointer_move(&mut self, screen: Point, mods: Modifiers) -> EventOutcome {
        let world = self.viewport.screen_to_world(screen);
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let (gesture, outcome) = match gesture {
            Gesture::Idle => {
                let before = self.hover_handle;
                self.hover_handle = self.handle_under(world);
                (Gesture::Idle, EventOutcome::from_change(before != self.hover_handle))
            }
            Gesture::Pan { mode, origin } => {
                let action = if mode == PanMode::ShiftPanning {
                    // Shift-pan follows the dominant axis only.
                    let (dx, dy) = constrain_axis(screen.x - origin.x, screen.y - origin.y);
                    ViewportAction::UpdateShiftPan {
                        screen: Point::new(origin.x + dx, origin.y + dy),
                    }
                } else {
                    ViewportAction::UpdatePan { screen }
                };
                self.apply_view(action);
                (Gesture::Pan { mode, origin }, EventOutcome::CHANGED)
            }
            Gesture::Draw(mut tool) => {
                tool.handle(&ToolEvent::new(Phase::Move, world, mods));
                (Gesture::Draw(tool), EventOutcome::CHANGED)
            }
            Gesture::Drag {
                origin,
                originals,
                moved,
                toggle_on_click,
            } => {
                let (mut dx, mut dy) = (world.x - origin.x, world.y - origin.y);
                // Shift: constrain to dominant axis
                if mods.shift {
                    (dx, dy) = constrain_axis(dx, dy);
                }
                for original in &originals {
                    let mut shape = original.clone();
                    shape.translate(dx, dy);
                    self.apply(ShapeAction::UpdateShape {
                        id: shape.id,
                        patch: ShapePatch::geometry_of(&shape),
                    });
                }
                let moved = moved || dx != 0.0 || dy != 0.0;
                let gesture = Gesture::Drag {
                    origin,
                    originals,
                    moved,
                    toggle_on_click,
                };
                (gesture, EventOutcome::CHANGED)
            }
            Gesture::Resize {
                handle,
                group,
                originals,
                resized,
            } => {
                let target =
                    resize_bounds(&group, handle, world, self.config.min_shape_size, mods.shift);
                for original in &originals {
                    let shape = remapped(original, &group, &target);
                    self.apply(ShapeAction::UpdateShape {
                        id: shape.id,
                        patch: ShapePatch::geometry_of(&shape),
                    });
                }
                let gesture = Gesture::Resize {
                    handle,
                    group,
                    originals,
                    resized: resized || target != group,
                };
                (gesture, EventOutcome::CHANGED)
            }
            Gesture::Marquee {
                start,
                additive,
                base,
                ..
            } => {
                let gesture = Gesture::Marquee {
                    start,
                    current: world,
                    additive,
                    base,
                };
                (gesture, EventOutcome::CHANGED)
            }
            erase @ Gesture::Erase { .. } => {
                self.gesture = erase;
                let outcome = self.erase_at(world);
                return outcome;
            }
        };
        self.gesture = gesture;
        outcome
    }

    fn pointer_up(&mut self, screen: Point, mods: Modifiers) -> EventOutcome {
        let world = self.viewport.screen_to_world(screen);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => EventOutcome::NONE,
            Gesture::Pan { mode, .. } => {
                self.apply_view(match mode {
                    PanMode::ShiftPanning => ViewportAction::EndShiftPan,
                    _ => ViewportAction::EndPan,
                });
                EventOutcome::CHANGED
            }
            Gesture::Draw(mut tool) => {
                match tool.handle(&ToolEvent::new(Phase::Up, world, mods)) {
                    Some(kind) => self.commit_drawing(kind),
                    None => EventOutcome::CHANGED,
                }
            }
            Gesture::Drag {
                moved,
                toggle_on_click,
                ..
            } => {
                if moved {
                    self.record("move");
                    return EventOutcome::COMMITTED;
                }
                if let Some(id) = toggle_on_click {
                    self.apply(ShapeAction::ToggleSelection(id));
                    return EventOutcome::CHANGED;
                }
                EventOutcome::NONE
            }
            Gesture::Resize { resized, .. } => {
                if resized {
                    self.record("resize");
                }
                EventOutcome::from_commit(resized)
            }
            Gesture::Marquee {
                start,
                current,
                additive,
                base,
            } => {
                let rect = Bounds::from_corners(start, current);
                let min_drag = 2.0 / self.viewport.scale;
                if rect.w > min_drag || rect.h > min_drag {
                    let mut ids: Vec<ShapeId> = hit_test_rect(&self.shapes.shapes, &rect);
                    if additive {
                        ids.extend(base);
                    }
                    self.apply(ShapeAction::SetSelection(ids));
                }
                EventOutcome::CHANGED
            }
            Gesture::Erase { erased } => {
                let committed = !erased.is_empty();
                if committed {
                    log::debug!("sf_editor::editor: eraser removed {} shapes", erased.len());
                    self.record("erase");
                }
                EventOutcome::from_commit(committed)
            }
        }
    }

    fn commit_drawing(&mut self, kind: ShapeKind) -> EventOutcome {
        let is_text = matches!(kind, ShapeKind::Text { .. });
        let shape = Shape::new(ShapeId::fresh(), &self.config.style, kind);
        let id = shape.id;
        self.apply(ShapeAction::AddShape(shape));
        self.apply(ShapeAction::SetSelection(vec![id]));

        if is_text {
            // Recorded when the edit is committed; an empty text vanishes.
            self.apply(ShapeAction::BeginTextEdit(id));
            return EventOutcome::CHANGED;
        }

        self.record("draw");
        let mut outcome = EventOutcome::COMMITTED;
        // Freedraw stays armed for consecutive strokes.
        if self.shapes.tool != Tool::Freedraw {
            self.apply(ShapeAction::SetTool(Tool::Select));
            outcome.tool_switched = true;
        }
        outcome
    }

    fn double_click(&mut self, screen: Point) -> EventOutcome {
        if self.shapes.tool != Tool::Select || self.is_gesture_active() {
            return EventOutcome::NONE;
        }
        let world = self.viewport.screen_to_world(screen);
        match self.hit(world) {
            Some(id) if self.begin_text_edit(id) => EventOutcome {
                changed: true,
                committed: false,
                tool_switched: true,
            },
            _ => EventOutcome::NONE,
        }
    }

    fn wheel(&mut self, dx: f64, dy: f64, focus: Point, mods: Modifiers) -> EventOutcome {
        let action = if mods.cmd() {
            if dy == 0.0 {
                return EventOutcome::NONE;
            }
            let step = 1.0 + self.viewport.zoom_step;
            ViewportAction::ZoomBy {
                factor: if dy < 0.0 { step } else { 1.0 / step },
                focus: Some(focus),
            }
        } else if mods.shift {
            // Shift+wheel scrolls horizontally.
            ViewportAction::WheelPan { dx: dy, dy: dx }
        } else {
            ViewportAction::WheelPan { dx, dy }
        };
        self.apply_view(action);
        EventOutcome::CHANGED
    }

    fn key_down(&mut self, key: &str, mods: Modifiers) -> EventOutcome {
        if self.shapes.editing_text_id.is_some() {
            // Text input belongs to the inline editor; only Escape leaves.
            if key == "Escape" {
                return EventOutcome::from_commit(self.commit_text_edit());
            }
            return EventOutcome::NONE;
        }
        match ShortcutMap::resolve(key, mods.ctrl, mods.shift, mods.alt, mods.meta) {
            Some(action) => {
                log::trace!("sf_editor::editor: shortcut {}", action.name());
                self.dispatch_shortcut(action)
            }
            None => EventOutcome::NONE,
        }
    }

    fn key_up(&mut self, key: &str) -> EventOutcome {
        if key != " " {
            return EventOutcome::NONE;
        }
        self.space_held = false;
        if let Gesture::Pan { mode, .. } = self.gesture
            && self.shapes.tool != Tool::Hand
        {
            self.gesture = Gesture::Idle;
            self.apply_view(match mode {
                PanMode::ShiftPanning => ViewportAction::EndShiftPan,
                _ => ViewportAction::EndPan,
            });
        }
        EventOutcome::CHANGED
    }

    /// Run a shortcut action.
    pub fn dispatch_shortcut(&mut self, action: ShortcutAction) -> EventOutcome {
        match action {
            ShortcutAction::SetTool(tool) => {
                let switched = self.set_tool(tool);
                EventOutcome {
                    changed: switched,
                    committed: false,
                    tool_switched: switched,
                }
            }
            ShortcutAction::Undo => EventOutcome::from_commit(self.undo()),
            ShortcutAction::Redo => EventOutcome::from_commit(self.redo()),
            ShortcutAction::Delete => EventOutcome::from_commit(self.delete_selected()),
            ShortcutAction::SelectAll => EventOutcome::from_change(self.select_all()),
            ShortcutAction::Duplicate => EventOutcome::from_commit(self.duplicate_selected()),
            ShortcutAction::Copy => {
                self.copy_selection();
                EventOutcome::NONE
            }
            ShortcutAction::Cut => EventOutcome::from_commit(self.cut_selection()),
            ShortcutAction::Paste => EventOutcome::from_commit(self.paste()),
            ShortcutAction::Escape => EventOutcome::from_change(self.escape()),
            ShortcutAction::ZoomIn => {
                self.zoom_in();
                EventOutcome::CHANGED
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
                EventOutcome::CHANGED
            }
            ShortcutAction::ResetZoom => {
                self.reset_zoom();
                EventOutcome::CHANGED
            }
            ShortcutAction::ZoomToFit => {
                self.zoom_to_fit();
                EventOutcome::CHANGED
            }
            ShortcutAction::PanStart => {
                let changed = !self.space_held;
                self.space_held = true;
                EventOutcome::from_change(changed)
            }
            ShortcutAction::SendBackward => {
                EventOutcome::from_commit(self.reorder(ShapeAction::SendBackward))
            }
            ShortcutAction::BringForward => {
                EventOutcome::from_commit(self.reorder(ShapeAction::BringForward))
            }
            ShortcutAction::SendToBack => {
                EventOutcome::from_commit(self.reorder(ShapeAction::SendToBack))
            }
            ShortcutAction::BringToFront => {
                EventOutcome::from_commit(self.reorder(ShapeAction::BringToFront))
            }
        }
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Switch the active tool. Returns true if it changed.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if tool == self.shapes.tool {
            return false;
        }
        self.cancel_gesture();
        if self.shapes.editing_text_id.is_some() {
            self.commit_text_edit();
        }
        self.hover_handle = None;
        self.apply(ShapeAction::SetTool(tool));
        true
    }

    pub fn undo(&mut self) -> bool {
        self.settle_for_history();
        let Some(action) = self.history.undo().map(|e| e.restore_action()) else {
            return false;
        };
        self.apply(action);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.settle_for_history();
        let Some(action) = self.history.redo().map(|e| e.restore_action()) else {
            return false;
        };
        self.apply(action);
        true
    }

    /// Replace the selection, e.g. from a layers panel. Unknown ids are
    /// ignored.
    pub fn set_selection(&mut self, ids: Vec<ShapeId>) {
        self.apply(ShapeAction::SetSelection(ids));
    }

    pub fn select_all(&mut self) -> bool {
        if self.shapes.shapes.is_empty() {
            return false;
        }
        self.apply(ShapeAction::SelectAll);
        true
    }

    /// Leave text editing, abandon a gesture, or drop the selection.
    pub fn escape(&mut self) -> bool {
        if self.is_gesture_active() {
            self.cancel_gesture();
            return true;
        }
        if self.shapes.selected.is_empty() {
            return false;
        }
        self.apply(ShapeAction::ClearSelection);
        true
    }

    /// Delete the selected shapes as one history entry.
    pub fn delete_selected(&mut self) -> bool {
        let ids = self.shapes.selected_ids();
        if ids.is_empty() {
            return false;
        }
        self.apply(ShapeAction::DeleteShapes(ids));
        self.record("delete");
        true
    }

    pub fn clear_canvas(&mut self) -> bool {
        if self.shapes.shapes.is_empty() {
            return false;
        }
        self.cancel_gesture();
        self.apply(ShapeAction::ClearCanvas);
        self.record("clear");
        true
    }

    /// Copy the selection into the internal clipboard.
    pub fn copy_selection(&mut self) -> bool {
        let copied: Vec<Shape> = self.shapes.selected_shapes().into_iter().cloned().collect();
        if copied.is_empty() {
            return false;
        }
        self.clipboard = copied;
        self.paste_count = 0;
        true
    }

    pub fn cut_selection(&mut self) -> bool {
        self.copy_selection() && self.delete_selected()
    }

    /// Paste the clipboard with fresh ids, offset further on each paste.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() {
            return false;
        }
        self.paste_count += 1;
        let offset = self.config.paste_offset * f64::from(self.paste_count);
        let shapes = std::mem::take(&mut self.clipboard);
        self.insert_copies(&shapes, offset);
        self.clipboard = shapes;
        true
    }

    pub fn duplicate_selected(&mut self) -> bool {
        let originals = self.selected_clones();
        if originals.is_empty() {
            return false;
        }
        self.insert_copies(&originals, self.config.paste_offset);
        true
    }

    /// Clipboard contents as JSON, for the system clipboard.
    pub fn clipboard_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.clipboard)
    }

    /// Paste shapes from JSON produced by [`clipboard_json`](Self::clipboard_json).
    ///
    /// The payload comes from outside the editor, so every shape must pass
    /// the same checks as a loaded document and ids must be unique. Nothing
    /// is inserted unless all of them do.
    pub fn paste_json(&mut self, json: &str) -> Result<bool, LoadError> {
        let shapes: Vec<Shape> = serde_json::from_str(json)?;
        if shapes.is_empty() {
            return Ok(false);
        }
        let mut seen = HashSet::with_capacity(shapes.len());
        for shape in &shapes {
            if !seen.insert(shape.id) {
                return Err(LoadError::DuplicateId(shape.id.to_string()));
            }
            validate_shape(shape)?;
        }
        self.insert_copies(&shapes, self.config.paste_offset);
        Ok(true)
    }

    fn insert_copies(&mut self, shapes: &[Shape], offset: f64) -> Vec<ShapeId> {
        let fresh: HashMap<ShapeId, ShapeId> =
            shapes.iter().map(|s| (s.id, ShapeId::fresh())).collect();
        let copies: Vec<Shape> = shapes
            .iter()
            .map(|original| {
                let mut copy = original.clone();
                copy.id = fresh[&original.id];
                copy.translate(offset, offset);
                // Keep generated UI attached to a frame copied alongside it.
                if let ShapeKind::GeneratedUi {
                    source_frame_id, ..
                } = &mut copy.kind
                    && let Some(new_frame) = fresh.get(source_frame_id)
                {
                    *source_frame_id = *new_frame;
                }
                copy
            })
            .collect();
        let ids: Vec<ShapeId> = copies.iter().map(|s| s.id).collect();
        self.apply(ShapeAction::AddShapes(copies));
        self.apply(ShapeAction::SetSelection(ids.clone()));
        self.record("paste");
        ids
    }

    fn reorder(&mut self, make: fn(Vec<ShapeId>) -> ShapeAction) -> bool {
        let ids = self.shapes.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let before = self.shapes.shapes.ids.clone();
        self.apply(make(ids));
        if self.shapes.shapes.ids == before {
            return false;
        }
        self.record("reorder");
        true
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.reorder(ShapeAction::BringToFront)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.reorder(ShapeAction::SendToBack)
    }

    /// Apply a style patch to every selected shape as one history entry.
    pub fn restyle_selected(&mut self, style: &ShapeStyle) -> bool {
        let ids = self.shapes.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let patch = ShapePatch::with_style(style);
        for id in ids {
            self.apply(ShapeAction::UpdateShape {
                id,
                patch: patch.clone(),
            });
        }
        self.record("restyle");
        true
    }

    /// Style used for shapes drawn from now on.
    pub fn set_default_style(&mut self, style: ShapeStyle) {
        self.config.style = style;
    }

    // ─── Text editing ────────────────────────────────────────────────────

    /// Enter inline editing on a text shape.
    pub fn begin_text_edit(&mut self, id: ShapeId) -> bool {
        if !matches!(
            self.shapes.get(id).map(|s| &s.kind),
            Some(ShapeKind::Text { .. })
        ) {
            return false;
        }
        self.apply(ShapeAction::SetTool(Tool::Text));
        self.apply(ShapeAction::SetSelection(vec![id]));
        self.apply(ShapeAction::BeginTextEdit(id));
        true
    }

    /// Live text update from the inline editor. Not recorded until commit.
    pub fn set_editing_text(&mut self, text: &str) -> bool {
        let Some(id) = self.shapes.editing_text_id else {
            return false;
        };
        self.apply(ShapeAction::UpdateShape {
            id,
            patch: ShapePatch {
                text: Some(text.to_string()),
                ..Default::default()
            },
        });
        true
    }

    /// Leave text editing and return to the select tool. Returns true if a
    /// history entry was recorded.
    pub fn commit_text_edit(&mut self) -> bool {
        let Some(id) = self.shapes.editing_text_id else {
            return false;
        };
        self.apply(ShapeAction::EndTextEdit);
        self.apply(ShapeAction::SetTool(Tool::Select));
        let changed = self.history.current().map(|e| e.shapes.get(id)) != Some(self.shapes.get(id));
        if changed {
            self.record("text");
        }
        changed
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        let focus = self.screen.center();
        self.apply_view(ViewportAction::ZoomIn { focus: Some(focus) });
    }

    pub fn zoom_out(&mut self) {
        let focus = self.screen.center();
        self.apply_view(ViewportAction::ZoomOut { focus: Some(focus) });
    }

    pub fn reset_zoom(&mut self) {
        self.apply_view(ViewportAction::ResetZoom);
    }

    /// Fit all shapes on screen; resets the zoom on an empty canvas.
    pub fn zoom_to_fit(&mut self) {
        let action = match self.shapes.content_bounds() {
            Some(content) => ViewportAction::ZoomToFit {
                content,
                screen: self.screen,
                margin: self.config.viewport.fit_margin,
            },
            None => ViewportAction::ResetZoom,
        };
        self.apply_view(action);
    }

    // ─── Generation ──────────────────────────────────────────────────────

    pub fn generation_request(&self, frame_id: ShapeId) -> Option<GenerationRequest> {
        GenerationRequest::for_frame(&self.shapes, frame_id)
    }

    /// Insert an empty generated-UI placeholder next to `frame_id` and
    /// return the request to send plus the placeholder id.
    pub fn begin_generation(&mut self, frame_id: ShapeId) -> Option<(GenerationRequest, ShapeId)> {
        let request = self.generation_request(frame_id)?;
        let placeholder = placeholder_for(&request, &self.config.style);
        let id = placeholder.id;
        self.apply(ShapeAction::AddShape(placeholder));
        self.record("generate");
        Some((request, id))
    }

    /// Fill a placeholder with its generated payload. Returns false if the
    /// placeholder is gone or is not a generated-UI block.
    pub fn complete_generation(&mut self, placeholder: ShapeId, payload: String) -> bool {
        if !matches!(
            self.shapes.get(placeholder).map(|s| &s.kind),
            Some(ShapeKind::GeneratedUi { .. })
        ) {
            log::debug!("sf_editor::editor: placeholder {placeholder:?} no longer exists");
            return false;
        }
        self.apply(ShapeAction::UpdateShape {
            id: placeholder,
            patch: ShapePatch {
                payload: Some(payload),
                ..Default::default()
            },
        });
        self.record("generated");
        true
    }

    /// Placeholders still waiting for a payload.
    pub fn pending_generations(&self) -> Vec<ShapeId> {
        self.shapes
            .shapes
            .iter()
            .filter(|s| is_pending(s))
            .map(|s| s.id)
            .collect()
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

impl Editor {
    fn apply(&mut self, action: ShapeAction) {
        self.shapes = std::mem::take(&mut self.shapes).reduce(action);
        self.revision += 1;
    }

    fn apply_view(&mut self, action: ViewportAction) {
        self.viewport = self.viewport.reduce(action);
        self.revision += 1;
    }

    fn record(&mut self, what: &str) {
        self.history.record(snapshot(&self.shapes));
        log::debug!(
            "sf_editor::editor: recorded {what} ({} entries)",
            self.history.len()
        );
    }

    fn hit(&self, world: Point) -> Option<ShapeId> {
        hit_test(
            &self.shapes.shapes,
            world,
            self.config.hit_tolerance / self.viewport.scale,
        )
    }

    fn handle_under(&self, world: Point) -> Option<ResizeHandle> {
        if self.shapes.tool != Tool::Select {
            return None;
        }
        let group = self.shapes.selection_bounds()?;
        handle_at(&group, world, self.config.handle_size / self.viewport.scale)
    }

    fn selected_clones(&self) -> Vec<Shape> {
        self.shapes.selected_shapes().into_iter().cloned().collect()
    }

    fn erase_at(&mut self, world: Point) -> EventOutcome {
        let hits = shapes_under(
            &self.shapes.shapes,
            world,
            self.config.hit_tolerance / self.viewport.scale,
        );
        if hits.is_empty() {
            return EventOutcome::NONE;
        }
        if let Gesture::Erase { erased } = &mut self.gesture {
            erased.extend(hits.iter().copied());
        }
        self.apply(ShapeAction::DeleteShapes(hits.to_vec()));
        EventOutcome::CHANGED
    }

    /// Abandon the in-flight gesture, restoring the last recorded state for
    /// gestures that edit live.
    fn cancel_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Pan { mode, .. } => self.apply_view(match mode {
                PanMode::ShiftPanning => ViewportAction::EndShiftPan,
                _ => ViewportAction::EndPan,
            }),
            Gesture::Draw(mut tool) => tool.cancel(),
            Gesture::Marquee { base, .. } => {
                self.apply(ShapeAction::SetSelection(base.into_iter().collect()));
            }
            Gesture::Drag { .. } | Gesture::Resize { .. } | Gesture::Erase { .. } => {
                if let Some(action) = self.history.current().map(|e| e.restore_action()) {
                    self.apply(action);
                }
            }
        }
    }

    fn settle_for_history(&mut self) {
        self.cancel_gesture();
        if self.shapes.editing_text_id.is_some() {
            self.commit_text_edit();
        }
    }
}

/// `original` mapped from the `from` group box onto `to`. Text without an
/// explicit size gets one, so its layout box follows the resize.
fn remapped(original: &Shape, from: &Bounds, to: &Bounds) -> Shape {
    let mut shape = original.clone();
    if let ShapeKind::Text { w, h, .. } = &mut shape.kind {
        let b = original.bounds();
        w.get_or_insert(b.w);
        h.get_or_insert(b.h);
    }
    shape.remap(from, to);
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default())
    }

    fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64), mods: Modifiers) {
        editor.handle_event(&InputEvent::pointer_down(from.0, from.1, mods));
        editor.handle_event(&InputEvent::pointer_move(
            (from.0 + to.0) / 2.0,
            (from.1 + to.1) / 2.0,
            mods,
        ));
        editor.handle_event(&InputEvent::pointer_move(to.0, to.1, mods));
        editor.handle_event(&InputEvent::pointer_up(to.0, to.1, mods));
    }

    fn only_shape(editor: &Editor) -> &Shape {
        assert_eq!(editor.shapes().shapes.len(), 1);
        editor.shapes().shapes.iter().next().unwrap()
    }

    #[test]
    fn drawing_commits_once_and_returns_to_select() {
        let mut e = editor();
        e.set_tool(Tool::Rect);
        e.handle_event(&InputEvent::pointer_down(10.0, 10.0, Modifiers::NONE));
        for i in 0..20 {
            e.handle_event(&InputEvent::pointer_move(
                10.0 + f64::from(i) * 2.0,
                12.0 + f64::from(i) * 2.0,
                Modifiers::NONE,
            ));
            assert!(e.shapes().shapes.is_empty(), "draft must stay out of the table");
        }
        assert!(e.draft().is_some());
        let out = e.handle_event(&InputEvent::pointer_up(60.0, 60.0, Modifiers::NONE));
        assert!(out.committed && out.tool_switched);
        assert_eq!(e.tool(), Tool::Select);
        assert_eq!(only_shape(&e).bounds(), Bounds::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(e.selected_ids(), vec![only_shape(&e).id]);
        assert_eq!(e.history().len(), 2);
    }

    #[test]
    fn freedraw_keeps_its_tool() {
        let mut e = editor();
        e.set_tool(Tool::Freedraw);
        drag(&mut e, (0.0, 0.0), (30.0, 40.0), Modifiers::NONE);
        assert_eq!(e.tool(), Tool::Freedraw);
        assert_eq!(e.shapes().shapes.len(), 1);
    }

    #[test]
    fn drag_moves_selection_as_one_entry() {
        let mut e = editor();
        e.set_tool(Tool::Rect);
        drag(&mut e, (10.0, 10.0), (60.0, 60.0), Modifiers::NONE);
        let entries = e.history().len();

        drag(&mut e, (30.0, 30.0), (130.0, 80.0), Modifiers::NONE);
        assert_eq!(only_shape(&e).bounds(), Bounds::new(110.0, 60.0, 50.0, 50.0));
        assert_eq!(e.history().len(), entries + 1);

        e.undo();
        assert_eq!(only_shape(&e).bounds(), Bounds::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn shift_drag_locks_axis() {
        let mut e = editor();
        e.set_tool(Tool::Rect);
        drag(&mut e, (10.0, 10.0), (60.0, 60.0), Modifiers::NONE);
        drag(&mut e, (30.0, 30.0), (130.0, 45.0), Modifiers::SHIFT);
        assert_eq!(only_shape(&e).bounds(), Bounds::new(110.0, 10.0, 50.0, 50.0));
        // Still selected: a moved shift-drag never toggles.
        assert_eq!(e.selected_ids(), vec![only_shape(&e).id]);
        assert_eq!(e.history().len(), 3);
    }

    #[test]
    fn shift_click_on_selected_deselects_on_release() {
        let mut e = editor();
        e.set_tool(Tool::Rect);
        drag(&mut e, (10.0, 10.0), (60.0, 60.0), Modifiers::NONE);
        e.handle_event(&InputEvent::pointer_down(30.0, 30.0, Modifiers::SHIFT));
        assert_eq!(e.selected_ids().len(), 1, "kept selected while pressed");
        let out = e.handle_event(&InputEvent::pointer_up(30.0, 30.0, Modifiers::SHIFT));
        assert!(out.changed && !out.committed);
        assert!(e.selected_ids().is_empty());
        assert_eq!(e.history().len(), 2);
    }

    #[test]
    fn resize_past_anchor_clamps() {
        let mut e = editor();
        e.set_tool(Tool::Rect);
        drag(&mut e, (10.0, 10.0), (60.0, 60.0), Modifiers::NONE);
        // Grab the bottom-right handle and pull far past the top-left corner.
        drag(&mut e, (60.0, 60.0), (-200.0, -200.0), Modifiers::NONE);
        let b = only_shape(&e).bounds();
        assert_eq!(b, Bounds::new(10.0, 10.0, 1.0, 1.0));
    }

    #[test]
    fn marquee_selects_intersecting() {
        let mut e = editor();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (300.0, 300.0)] {
            e.set_tool(Tool::Ellipse);
            drag(&mut e, (x, y), (x + 20.0, y + 20.0), Modifiers::NONE);
        }
        e.escape();
        drag(&mut e, (-5.0, -5.0), (110.0, 10.0), Modifiers::NONE);
        assert_eq!(e.selected_ids().len(), 2);
        assert!(e.marquee().is_none());
    }

    #[test]
    fn eraser_stroke_is_one_entry() {
        let mut e = editor();
        for (x, y) in [(0.0, 0.0), (40.0, 0.0), (400.0, 400.0)] {
            e.set_tool(Tool::Rect);
            drag(&mut e, (x, y), (x + 20.0, y + 20.0), Modifiers::NONE);
        }
        let entries = e.history().len();
        e.set_tool(Tool::Eraser);
        drag(&mut e, (10.0, 10.0), (50.0, 10.0), Modifiers::NONE);
        assert_eq!(e.shapes().shapes.len(), 1);
        assert_eq!(e.history().len(), entries + 1);
        e.undo();
        assert_eq!(e.shapes().shapes.len(), 3);
    }

    #[test]
    fn text_lifecycle() {
        let mut e = editor();
        e.set_tool(Tool::Text);
        drag(&mut e, (50.0, 50.0), (50.0, 50.0), Modifiers::NONE);
        let id = e.shapes().editing_text_id.unwrap();
        e.set_editing_text("Hello");
        let out = e.handle_event(&InputEvent::key("Escape", Modifiers::NONE));
        assert!(out.committed);
        assert_eq!(e.tool(), Tool::Select);
        assert!(e.shapes().get(id).is_some());

        // An empty text disappears when editing ends.
        e.set_tool(Tool::Text);
        drag(&mut e, (200.0, 200.0), (200.0, 200.0), Modifiers::NONE);
        assert!(e.shapes().editing_text_id.is_some());
        e.handle_event(&InputEvent::key("Escape", Modifiers::NONE));
        assert_eq!(e.shapes().shapes.len(), 1);
    }

    #[test]
    fn space_pans_and_wheel_zooms() {
        let mut e = editor();
        e.handle_event(&InputEvent::key(" ", Modifiers::NONE));
        assert_eq!(e.cursor(), Cursor::Grab);
        e.handle_event(&InputEvent::pointer_down(100.0, 100.0, Modifiers::NONE));
        assert_eq!(e.cursor(), Cursor::Grabbing);
        e.handle_event(&InputEvent::pointer_move(130.0, 90.0, Modifiers::NONE));
        e.handle_event(&InputEvent::pointer_up(130.0, 90.0, Modifiers::NONE));
        assert_eq!(e.viewport().translate, Point::new(30.0, -10.0));
        assert_eq!(e.viewport().mode, PanMode::Idle);

        let focus = Point::new(400.0, 300.0);
        let world_before = e.viewport().screen_to_world(focus);
        e.handle_event(&InputEvent::Wheel {
            dx: 0.0,
            dy: -120.0,
            x: focus.x,
            y: focus.y,
            modifiers: Modifiers::CTRL,
        });
        assert!(e.viewport().scale > 1.0);
        let world_after = e.viewport().screen_to_world(focus);
        assert!((world_after.x - world_before.x).abs() < 1e-9);
        assert!((world_after.y - world_before.y).abs() < 1e-9);
    }

    #[test]
    fn shift_pan_follows_dominant_axis() {
        let mut e = editor();
        e.set_tool(Tool::Hand);
        drag(&mut e, (0.0, 0.0), (50.0, 20.0), Modifiers::SHIFT);
        assert_eq!(e.viewport().translate, Point::new(50.0, 0.0));
    }

    #[test]
    fn paste_offsets_and_renumbers_frames() {
        let mut e = editor();
        e.set_tool(Tool::Frame);
        drag(&mut e, (0.0, 0.0), (100.0, 100.0), Modifiers::NONE);
        assert!(e.copy_selection());
        assert!(e.paste());
        assert!(e.paste());
        let numbers: Vec<u32> = e.shapes().frames().filter_map(Shape::frame_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let last = e.selected_ids()[0];
        assert_eq!(e.shapes().get(last).unwrap().bounds().x, 32.0);
    }

    #[test]
    fn generation_placeholder_survives_failure() {
        let mut e = editor();
        e.set_tool(Tool::Frame);
        drag(&mut e, (0.0, 0.0), (200.0, 200.0), Modifiers::NONE);
        let frame = e.selected_ids()[0];
        e.set_tool(Tool::Rect);
        drag(&mut e, (20.0, 20.0), (60.0, 60.0), Modifiers::NONE);

        let (request, placeholder) = e.begin_generation(frame).unwrap();
        assert_eq!(request.shape_ids.len(), 1);
        assert_eq!(e.pending_generations(), vec![placeholder]);

        assert!(e.complete_generation(placeholder, "<main/>".into()));
        assert!(e.pending_generations().is_empty());
        assert!(!e.complete_generation(ShapeId::intern("gone"), String::new()));
    }
}
