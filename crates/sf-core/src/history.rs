//! Bounded snapshot history with linear undo/redo.
//!
//! Each entry is a deep copy of the shape-side state taken after a discrete
//! edit (draw committed, drag released, delete, paste). The pointer marks
//! the entry matching the live state. Recording while the pointer is not at
//! the tail drops the redo branch; overflowing `max_size` evicts the oldest
//! entry.

use crate::entity::EntityState;
use crate::id::ShapeId;
use crate::model::Shape;
use crate::shapes::{ShapeAction, ShapesState};
use std::collections::{BTreeSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Immutable snapshot of shapes, selection and frame counter.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub shapes: EntityState<Shape>,
    pub selected: BTreeSet<ShapeId>,
    pub frame_counter: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    /// The reducer action that brings live state back to this entry.
    pub fn restore_action(&self) -> ShapeAction {
        ShapeAction::Restore {
            shapes: self.shapes.clone(),
            selected: self.selected.clone(),
            frame_counter: self.frame_counter,
        }
    }
}

/// Deep-copy the historied part of `state`.
pub fn snapshot(state: &ShapesState) -> HistoryEntry {
    HistoryEntry {
        shapes: state.shapes.clone(),
        selected: state.selected.clone(),
        frame_counter: state.frame_counter,
        timestamp: now_millis(),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    /// Index of the entry matching the live state; `None` when empty.
    pointer: Option<usize>,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// A zero cap is treated as one so the live state always has an entry.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size),
            pointer: None,
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.pointer?)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Push `entry` after the pointer, truncating any redo branch and
    /// evicting from the oldest end past `max_size`.
    pub fn record(&mut self, entry: HistoryEntry) {
        if let Some(p) = self.pointer {
            let dropped = self.entries.len().saturating_sub(p + 1);
            if dropped > 0 {
                log::trace!("sf_core::history: dropping {dropped} redo entries");
            }
            self.entries.truncate(p + 1);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.pointer = Some(self.entries.len() - 1);
    }

    /// Step back. `None` at the oldest entry; the pointer stays put.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let p = self.pointer.filter(|p| *p > 0)?;
        self.pointer = Some(p - 1);
        self.entries.get(p - 1)
    }

    /// Step forward. `None` at the newest entry; the pointer stays put.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let p = self.pointer.filter(|p| p + 1 < self.entries.len())?;
        self.pointer = Some(p + 1);
        self.entries.get(p + 1)
    }

    pub fn can_undo(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// Drop everything and start over from a single baseline entry.
    pub fn reset(&mut self, baseline: HistoryEntry) {
        self.entries.clear();
        self.entries.push_back(baseline);
        self.pointer = Some(0);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }
}
