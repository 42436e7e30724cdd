//! Persistence bridge.
//!
//! DESIGN
//! ======
//! Two tiers, neither of which ever blocks editing:
//!
//! - the local cache is written on a trailing 1 s debounce after the last
//!   change, so a burst of edits produces one write;
//! - the durable store is written on explicit request ([`PersistenceBridge::sync_remote`])
//!   by a spawned task whose outcome is published on a [`SyncStatus`]
//!   watch channel.
//!
//! ERROR HANDLING
//! ==============
//! Failed writes are logged and reported, never retried here. Restore reads
//! the cache first, then the store, and falls back to an empty canvas; a
//! corrupt or invalid entry at either tier counts as absent.

use crate::debounce::Debouncer;
use crate::error::PersistError;
use crate::record::ProjectRecord;
use crate::store::{LocalCache, ProjectStore};
use sf_core::CanvasDocument;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const DEFAULT_CACHE_DEBOUNCE_MS: u64 = 1000;

/// Tuning knobs for the bridge, loadable from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Quiet period before the local cache is written.
    pub cache_debounce: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            cache_debounce: Duration::from_millis(DEFAULT_CACHE_DEBOUNCE_MS),
        }
    }
}

impl PersistConfig {
    /// Reads `SF_CACHE_DEBOUNCE_MS`; unset or unparsable values keep the
    /// default.
    pub fn from_env() -> Self {
        Self {
            cache_debounce: Duration::from_millis(env_parse(
                "SF_CACHE_DEBOUNCE_MS",
                DEFAULT_CACHE_DEBOUNCE_MS,
            )),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// State of the durable store as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    /// A remote write is in flight.
    Saving,
    /// The last remote write succeeded.
    Saved,
    /// The last remote write failed; editing continues locally.
    Error(String),
}

/// Where a restored document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    Cache,
    Remote,
    Empty,
}

#[derive(Debug)]
pub struct Restored {
    pub document: CanvasDocument,
    pub source: RestoreSource,
    /// The most recent problem met on the way, if any.
    pub error: Option<PersistError>,
}

pub struct PersistenceBridge<S, C> {
    project_id: Arc<str>,
    store: Arc<S>,
    cache: Arc<C>,
    debouncer: Debouncer,
    status: Arc<watch::Sender<SyncStatus>>,
    remote_write: Option<JoinHandle<()>>,
    last_revision: Option<u64>,
}

impl<S: ProjectStore, C: LocalCache> PersistenceBridge<S, C> {
    pub fn new(project_id: &str, store: S, cache: C, config: PersistConfig) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        log::debug!(
            "sf_bridge::bridge: project `{project_id}` with {:?} cache debounce",
            config.cache_debounce
        );
        Self {
            project_id: Arc::from(project_id),
            store: Arc::new(store),
            cache: Arc::new(cache),
            debouncer: Debouncer::new(config.cache_debounce),
            status: Arc::new(status),
            remote_write: None,
            last_revision: None,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn cache_write_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Schedule a debounced cache write of `doc`.
    pub fn notify_changed(&mut self, doc: &CanvasDocument) {
        let record = match ProjectRecord::from_document(doc) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("sf_bridge::bridge: cannot encode project `{}`: {e}", self.project_id);
                return;
            }
        };
        let cache = Arc::clone(&self.cache);
        let project = Arc::clone(&self.project_id);
        self.debouncer.schedule(async move {
            if let Err(e) = cache.save(&project, &record).await {
                log::warn!("sf_bridge::bridge: cache write for `{project}` failed: {e}");
            }
        });
    }

    /// Schedule a cache write only if `revision` moved since the last call.
    /// `doc` is built only when needed.
    pub fn observe(&mut self, revision: u64, doc: impl FnOnce() -> CanvasDocument) -> bool {
        if self.last_revision == Some(revision) {
            return false;
        }
        self.last_revision = Some(revision);
        self.notify_changed(&doc());
        true
    }

    /// Write `doc` to the cache now, dropping any pending debounced write.
    pub async fn flush(&mut self, doc: &CanvasDocument) -> Result<(), PersistError> {
        self.debouncer.cancel();
        let record = ProjectRecord::from_document(doc)?;
        self.cache.save(&self.project_id, &record).await?;
        Ok(())
    }

    /// Write `doc` to the durable store in the background. A write still in
    /// flight is superseded.
    pub fn sync_remote(&mut self, doc: &CanvasDocument) {
        let record = match ProjectRecord::from_document(doc) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("sf_bridge::bridge: cannot encode project `{}`: {e}", self.project_id);
                self.status.send_replace(SyncStatus::Error(e.to_string()));
                return;
            }
        };
        if let Some(previous) = self.remote_write.take() {
            previous.abort();
        }
        self.status.send_replace(SyncStatus::Saving);

        let store = Arc::clone(&self.store);
        let status = Arc::clone(&self.status);
        let project = Arc::clone(&self.project_id);
        self.remote_write = Some(tokio::spawn(async move {
            match store.put(&project, record).await {
                Ok(()) => {
                    log::debug!("sf_bridge::bridge: saved `{project}` to store");
                    status.send_replace(SyncStatus::Saved);
                }
                Err(e) => {
                    log::warn!("sf_bridge::bridge: store write for `{project}` failed: {e}");
                    status.send_replace(SyncStatus::Error(e.to_string()));
                }
            }
        }));
    }

    /// Load the project: cache first, then the store, else an empty canvas.
    pub async fn restore(&self) -> Restored {
        let mut error = None;

        match self.cache.load(&self.project_id).await {
            Ok(Some(record)) => match record.into_document() {
                Ok(document) => {
                    return Restored {
                        document,
                        source: RestoreSource::Cache,
                        error: None,
                    };
                }
                Err(e) => {
                    log::warn!("sf_bridge::bridge: ignoring invalid cache entry: {e}");
                    error = Some(e.into());
                }
            },
            Ok(None) => {}
            Err(e) => {
                log::warn!("sf_bridge::bridge: ignoring unreadable cache entry: {e}");
                error = Some(e.into());
            }
        }

        match self.store.get(&self.project_id).await {
            Ok(Some(record)) => match record.into_document() {
                Ok(document) => {
                    return Restored {
                        document,
                        source: RestoreSource::Remote,
                        error,
                    };
                }
                Err(e) => {
                    log::warn!("sf_bridge::bridge: ignoring invalid store record: {e}");
                    error = Some(e.into());
                }
            },
            Ok(None) => {}
            Err(e) => {
                log::warn!("sf_bridge::bridge: store unavailable on restore: {e}");
                self.status.send_replace(SyncStatus::Error(e.to_string()));
                error = Some(e.into());
            }
        }

        Restored {
            document: CanvasDocument::default(),
            source: RestoreSource::Empty,
            error,
        }
    }

    /// Cancel the pending cache write and any in-flight store write.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        if let Some(handle) = self.remote_write.take() {
            handle.abort();
        }
    }
}

impl<S, C> Drop for PersistenceBridge<S, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.remote_write.take() {
            handle.abort();
        }
    }
}

/// Serialize a document for export.
pub fn export_json(doc: &CanvasDocument) -> Result<String, PersistError> {
    Ok(doc.to_json()?)
}

/// Parse and validate an imported document. The caller replaces its live
/// state with the result (`Editor::load_document`).
pub fn import_json(input: &str) -> Result<CanvasDocument, PersistError> {
    Ok(CanvasDocument::from_json(input)?)
}
