use thiserror::Error;

/// Why a persisted or imported document was rejected.
///
/// Callers fall back to an empty canvas on any of these; none is fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shape id `{0}` appears more than once")]
    DuplicateId(String),

    #[error("shape id `{0}` is ordered but has no entity")]
    OrphanId(String),

    #[error("entity stored under `{key}` carries id `{actual}`")]
    KeyMismatch { key: String, actual: String },

    #[error("entity `{0}` is missing from the paint order")]
    UnorderedEntity(String),

    #[error("frame number {0} is used by more than one frame")]
    DuplicateFrameNumber(u32),

    #[error("frame counter {counter} does not exceed the highest frame number {highest}")]
    FrameCounterBehind { counter: u32, highest: u32 },

    #[error("shape `{0}` has non-finite geometry")]
    NonFiniteGeometry(String),

    #[error("shape `{0}` has a negative stroke width")]
    NegativeStrokeWidth(String),

    #[error("shape `{0}` has a negative width or height")]
    NegativeSize(String),

    #[error("frame counter is exhausted; no further frame can be numbered")]
    FrameCounterExhausted,

    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
}
