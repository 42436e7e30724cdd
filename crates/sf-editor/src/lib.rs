pub mod cursor;
pub mod editor;
pub mod hit;
pub mod input;
pub mod shortcuts;
pub mod tools;
pub mod transform;

pub use cursor::{Cursor, CursorContext, resolve_cursor};
pub use editor::{Editor, EditorConfig, EventOutcome};
pub use hit::{hit_test, hit_test_rect, shapes_under};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{DrawTool, Phase, ToolEvent, drawing_tool};
pub use transform::{ResizeHandle, resize_bounds};
