//! Storage boundaries: the durable project store and the local cache.
//!
//! Both are keyed by project id and hold one [`ProjectRecord`] each. The
//! in-memory implementations back tests and offline use; [`FileCache`]
//! keeps one MessagePack file per project.

use crate::error::{CacheError, StoreError};
use crate::record::ProjectRecord;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Remote, durable storage. One record per project.
pub trait ProjectStore: Send + Sync + 'static {
    fn get(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Option<ProjectRecord>, StoreError>> + Send;

    fn put(
        &self,
        project_id: &str,
        record: ProjectRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Fast local recovery cache, read before the remote store at startup.
///
/// A missing entry is `Ok(None)`. A corrupt one is an error the bridge
/// treats the same as missing.
pub trait LocalCache: Send + Sync + 'static {
    fn load(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Option<ProjectRecord>, CacheError>> + Send;

    fn save(
        &self,
        project_id: &str,
        record: &ProjectRecord,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned map is still a valid map.
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ─── In-memory store ─────────────────────────────────────────────────────

/// Process-local store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, ProjectRecord>>>,
    offline: Arc<Mutex<bool>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        *lock(&self.offline) = offline;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *lock(&self.writes)
    }

    pub fn record(&self, project_id: &str) -> Option<ProjectRecord> {
        lock(&self.records).get(project_id).cloned()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if *lock(&self.offline) {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        Ok(())
    }
}

impl ProjectStore for MemoryStore {
    async fn get(&self, project_id: &str) -> Result<Option<ProjectRecord>, StoreError> {
        self.check_online()?;
        Ok(self.record(project_id))
    }

    async fn put(&self, project_id: &str, record: ProjectRecord) -> Result<(), StoreError> {
        self.check_online()?;
        lock(&self.records).insert(project_id.to_string(), record);
        *lock(&self.writes) += 1;
        Ok(())
    }
}

// ─── In-memory cache ─────────────────────────────────────────────────────

/// Cache that keeps encoded entries in memory, the way a browser's local
/// storage would. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an entry with raw bytes.
    pub fn insert_raw(&self, project_id: &str, bytes: Vec<u8>) {
        lock(&self.entries).insert(project_id.to_string(), bytes);
    }

    pub fn contains(&self, project_id: &str) -> bool {
        lock(&self.entries).contains_key(project_id)
    }
}

impl LocalCache for MemoryCache {
    async fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, CacheError> {
        let bytes = lock(&self.entries).get(project_id).cloned();
        match bytes {
            Some(bytes) => Ok(Some(rmp_serde::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, project_id: &str, record: &ProjectRecord) -> Result<(), CacheError> {
        let bytes = rmp_serde::to_vec_named(record)?;
        self.insert_raw(project_id, bytes);
        Ok(())
    }
}

// ─── File cache ──────────────────────────────────────────────────────────

/// One `<project>.msgpack` file per project under a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `project_id`. Path separators in the id are replaced
    /// so every project stays inside the cache directory.
    pub fn path_for(&self, project_id: &str) -> PathBuf {
        let name: String = project_id
            .chars()
            .map(|c| if c == '/' || c == '\\' || c == ':' { '_' } else { c })
            .collect();
        self.dir.join(format!("{name}.msgpack"))
    }
}

impl LocalCache for FileCache {
    async fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, CacheError> {
        let path = self.path_for(project_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(rmp_serde::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, project_id: &str, record: &ProjectRecord) -> Result<(), CacheError> {
        let bytes = rmp_serde::to_vec_named(record)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        // Write then rename so a crash never leaves a half-written entry.
        let path = self.path_for(project_id);
        let tmp = path.with_extension("msgpack.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
