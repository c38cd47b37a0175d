//! Delivery of finished exports and temporary blob handles.

use crate::result::CardResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Where a finished export is handed to the user
#[async_trait]
pub trait DownloadTarget: Send + Sync + fmt::Debug {
    /// Store `bytes` under `file_name`; returns the resulting location
    async fn save(&self, file_name: &str, bytes: &[u8]) -> CardResult<PathBuf>;
}

/// Writes downloads into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    /// Save into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadTarget for DirectoryDownloads {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> CardResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "download written");
        Ok(path)
    }
}

/// Keeps downloads in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloads {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryDownloads {
    /// Empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved files in order
    #[must_use]
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DownloadTarget for MemoryDownloads {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> CardResult<PathBuf> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    live: Mutex<HashMap<String, Arc<[u8]>>>,
}

/// Hands out temporary URLs for in-memory blobs
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<RegistryInner>,
}

impl BlobRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob; the URL is revoked when the handle drops
    #[must_use]
    pub fn register(&self, data: Vec<u8>) -> ObjectUrl {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:khelcard/{id}");
        let data: Arc<[u8]> = data.into();
        self.lock().insert(url.clone(), Arc::clone(&data));
        ObjectUrl {
            url,
            data,
            registry: self.clone(),
        }
    }

    /// Blob behind a live URL
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.lock().get(url).cloned()
    }

    /// Number of URLs not yet revoked
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, url: &str) {
        self.lock().remove(url);
        tracing::trace!(url, "object URL revoked");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        self.inner.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live blob URL
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
    data: Arc<[u8]>,
    registry: BlobRegistry,
}

impl ObjectUrl {
    /// The URL string
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Blob contents
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod registry_tests {
        use super::*;

        #[test]
        fn test_register_and_revoke() {
            let registry = BlobRegistry::new();
            let a = registry.register(vec![1, 2, 3]);
            let b = registry.register(vec![4]);
            assert_ne!(a.url(), b.url());
            assert_eq!(registry.live_count(), 2);
            assert_eq!(&*registry.resolve(a.url()).unwrap(), &[1, 2, 3]);

            let url = a.url().to_string();
            drop(a);
            assert!(registry.resolve(&url).is_none());
            assert_eq!(registry.live_count(), 1);
            drop(b);
            assert_eq!(registry.live_count(), 0);
        }

        #[test]
        fn test_revoked_on_panic_unwind() {
            let registry = BlobRegistry::new();
            let r = registry.clone();
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
                let _url = r.register(vec![0; 16]);
                panic!("delivery failed");
            }));
            assert!(result.is_err());
            assert_eq!(registry.live_count(), 0);
        }
    }

    mod download_tests {
        use super::*;

        #[tokio::test]
        async fn test_directory_downloads_creates_dir() {
            let dir = tempfile::tempdir().unwrap();
            let target = DirectoryDownloads::new(dir.path().join("out"));
            let path = target.save("a.webm", b"data").await.unwrap();
            assert_eq!(path, dir.path().join("out").join("a.webm"));
            assert_eq!(std::fs::read(path).unwrap(), b"data");
        }

        #[tokio::test]
        async fn test_memory_downloads_collects() {
            let target = MemoryDownloads::new();
            target.save("x.png", &[1]).await.unwrap();
            assert_eq!(target.files(), vec![("x.png".to_string(), vec![1])]);
        }
    }
}
