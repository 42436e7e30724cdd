//! File access for the generated-UI edit overlay.
//!
//! Canvas logic never touches these; they exist so the overlay can read
//! and write the generated sources. Every call is asynchronous and may
//! fail.

use crate::error::SandboxError;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

pub trait SandboxFs: Send + Sync {
    fn read_file(&self, path: &str) -> impl Future<Output = Result<String, SandboxError>> + Send;

    fn write_file(
        &self,
        path: &str,
        content: String,
    ) -> impl Future<Output = Result<(), SandboxError>> + Send;

    fn list_dir(&self, path: &str) -> impl Future<Output = Result<Vec<DirEntry>, SandboxError>> + Send;
}

/// Split `path` into components, rejecting anything that could leave the
/// sandbox root. `""` and `"/"` are the root.
pub fn normalize(path: &str) -> Result<Vec<&str>, SandboxError> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(SandboxError::InvalidPath(path.to_string())),
            p if p.contains('\\') || p.contains('\0') => {
                return Err(SandboxError::InvalidPath(path.to_string()));
            }
            p => parts.push(p),
        }
    }
    Ok(parts)
}

/// Flat in-memory file tree. Directories exist implicitly.
#[derive(Debug, Clone, Default)]
pub struct MemorySandbox {
    files: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemorySandbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SandboxFs for MemorySandbox {
    async fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        let key = normalize(path)?.join("/");
        self.files()
            .get(&key)
            .cloned()
            .ok_or_else(|| SandboxError::NotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: String) -> Result<(), SandboxError> {
        let key = normalize(path)?.join("/");
        if key.is_empty() {
            return Err(SandboxError::InvalidPath(path.to_string()));
        }
        self.files().insert(key, content);
        Ok(())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, SandboxError> {
        let dir = normalize(path)?.join("/");
        let prefix = if dir.is_empty() { String::new() } else { format!("{dir}/") };
        let files = self.files();
        let mut entries: Vec<DirEntry> = Vec::new();
        for key in files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let entry = match rest.split_once('/') {
                Some((child, _)) => DirEntry {
                    name: child.to_string(),
                    is_dir: true,
                },
                None => DirEntry {
                    name: rest.to_string(),
                    is_dir: false,
                },
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        if entries.is_empty() && !dir.is_empty() {
            return Err(SandboxError::NotFound(path.to_string()));
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn write_read_list() {
        let fs = MemorySandbox::new();
        fs.write_file("/src/App.tsx", "export {}".into()).await.unwrap();
        fs.write_file("src/components/Hero.tsx", "<Hero/>".into()).await.unwrap();
        fs.write_file("index.html", "<html/>".into()).await.unwrap();

        assert_eq!(fs.read_file("./src/App.tsx").await.unwrap(), "export {}");
        assert_eq!(
            fs.list_dir("/").await.unwrap(),
            vec![
                DirEntry { name: "index.html".into(), is_dir: false },
                DirEntry { name: "src".into(), is_dir: true },
            ]
        );
        assert_eq!(
            fs.list_dir("src").await.unwrap(),
            vec![
                DirEntry { name: "App.tsx".into(), is_dir: false },
                DirEntry { name: "components".into(), is_dir: true },
            ]
        );
    }

    #[tokio::test]
    async fn missing_and_escaping_paths() {
        let fs = MemorySandbox::new();
        assert!(matches!(fs.read_file("nope.txt").await, Err(SandboxError::NotFound(_))));
        assert!(matches!(fs.list_dir("nope").await, Err(SandboxError::NotFound(_))));
        assert!(matches!(
            fs.write_file("../etc/passwd", String::new()).await,
            Err(SandboxError::InvalidPath(_))
        ));
        assert!(fs.list_dir("").await.unwrap().is_empty());
    }
}
