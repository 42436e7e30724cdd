//! The per-project record exchanged with the durable store and the cache.
//!
//! `sketchesData` is the entity table in its own serialized form; stores
//! keep it as an opaque JSON value and never look inside. Only the shapes
//! and viewport survive a round trip through a record. Tool, selection and
//! text editing are session state and come back at their defaults.

use serde::{Deserialize, Serialize};
use sf_core::document::repaired_frame_counter;
use sf_core::{CanvasDocument, EntityState, LoadError, Shape, ShapesState, ViewportState};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub viewport_data: serde_json::Value,
    pub sketches_data: serde_json::Value,
    pub frame_counter: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: u64,
}

impl ProjectRecord {
    pub fn from_document(doc: &CanvasDocument) -> Result<Self, serde_json::Error> {
        Ok(Self {
            viewport_data: serde_json::to_value(doc.viewport.settled())?,
            sketches_data: serde_json::to_value(&doc.shapes.shapes)?,
            frame_counter: doc.shapes.frame_counter,
            updated_at: now_millis(),
        })
    }

    /// Decode and validate. A counter that lags behind the stored frames
    /// (an older writer, a hand-edited record) is raised rather than
    /// rejected; everything else structural is an error.
    pub fn into_document(self) -> Result<CanvasDocument, LoadError> {
        let viewport: ViewportState = serde_json::from_value(self.viewport_data)?;
        let shapes: EntityState<Shape> = serde_json::from_value(self.sketches_data)?;
        let frame_counter = repaired_frame_counter(&shapes, self.frame_counter);
        if frame_counter != self.frame_counter {
            log::debug!(
                "sf_bridge::record: frame counter {} raised to {frame_counter}",
                self.frame_counter
            );
        }
        let doc = CanvasDocument::new(
            viewport,
            ShapesState {
                shapes,
                frame_counter,
                ..ShapesState::default()
            },
        );
        doc.into_validated()
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
