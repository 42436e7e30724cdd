pub mod bridge;
pub mod debounce;
pub mod error;
pub mod generation;
pub mod record;
pub mod sandbox;
pub mod store;

pub use bridge::{
    PersistConfig, PersistenceBridge, RestoreSource, Restored, SyncStatus, export_json,
    import_json,
};
pub use debounce::Debouncer;
pub use error::{CacheError, GenerationError, PersistError, SandboxError, StoreError};
pub use generation::{GeneratedPayload, GenerationClient, GenerationJob, request_generation};
pub use record::ProjectRecord;
pub use sandbox::{DirEntry, MemorySandbox, SandboxFs};
pub use store::{FileCache, LocalCache, MemoryCache, MemoryStore, ProjectStore};
