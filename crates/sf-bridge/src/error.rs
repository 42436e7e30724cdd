//! Error types for the bridge crate.
//!
//! None of these is fatal to editing: the bridge reports them through
//! `SyncStatus` or hands them back to the caller, and the canvas keeps
//! working from memory and the local cache.

use sf_core::LoadError;
use std::io;
use thiserror::Error;

/// Durable project store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("project store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but refused the write.
    #[error("project store rejected write for `{project}`: {reason}")]
    Rejected { project: String, reason: String },

    #[error("project record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Local fast-recovery cache failures.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache entry could not be encoded: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("cache entry is corrupt: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// AI generation workflow failures.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request could not be described: {0}")]
    Describe(#[from] serde_json::Error),

    #[error("generation failed: {0}")]
    Failed(String),

    #[error("generation was cancelled")]
    Cancelled,
}

/// Sandbox file I/O failures.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("path escapes the sandbox: {0}")]
    InvalidPath(String),

    #[error("sandbox unavailable: {0}")]
    Unavailable(String),
}

/// Umbrella error for restore/import/export.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("invalid project data: {0}")]
    Load(#[from] LoadError),

    #[error("project could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
