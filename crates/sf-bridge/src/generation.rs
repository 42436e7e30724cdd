//! Call boundary for the external UI-generation workflow.
//!
//! The editor inserts an empty placeholder, the host awaits
//! [`request_generation`] off the input path, then hands the payload back
//! to `Editor::complete_generation`. On failure the placeholder stays where
//! it is so the user can retry or delete it.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use sf_core::{GenerationRequest, ShapeId};
use std::future::Future;

/// What the generation service is asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub frame_id: ShapeId,
    pub shape_ids: Vec<ShapeId>,
    /// JSON description of the frame and its contents.
    pub description: String,
}

impl GenerationJob {
    pub fn from_request(request: &GenerationRequest) -> Result<Self, GenerationError> {
        Ok(Self {
            frame_id: request.frame_id,
            shape_ids: request.shape_ids.clone(),
            description: request.describe()?,
        })
    }
}

/// Opaque generated content for a `generatedui` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPayload(pub String);

impl GeneratedPayload {
    pub fn into_inner(self) -> String {
        self.0
    }
}

pub trait GenerationClient: Send + Sync {
    fn generate(
        &self,
        job: GenerationJob,
    ) -> impl Future<Output = Result<GeneratedPayload, GenerationError>> + Send;
}

/// Describe `request` and run it through `client`.
pub async fn request_generation<G: GenerationClient>(
    client: &G,
    request: &GenerationRequest,
) -> Result<GeneratedPayload, GenerationError> {
    let job = GenerationJob::from_request(request)?;
    let frame = job.frame_id;
    log::debug!(
        "sf_bridge::generation: requesting frame {frame:?} with {} shapes",
        job.shape_ids.len()
    );
    client.generate(job).await.inspect_err(|e| {
        log::warn!("sf_bridge::generation: frame {frame:?} failed: {e}");
    })
}
