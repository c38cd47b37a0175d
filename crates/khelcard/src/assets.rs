//! Static image and font assets.
//!
//! Loading never fails the caller: a missing or undecodable file comes back
//! as `AssetOutcome::Unavailable` and the compositor draws a placeholder.

use crate::canvas::CardFont;
use crate::result::{CardError, CardResult};
use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of loading one image asset
#[derive(Debug, Clone)]
pub enum AssetOutcome {
    /// Decoded image
    Loaded(Arc<RgbaImage>),
    /// The asset could not be read or decoded
    Unavailable {
        /// Asset name that was requested
        name: String,
        /// Why it is unavailable
        reason: String,
    },
}

impl AssetOutcome {
    /// Decoded image, if loaded
    #[must_use]
    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            Self::Loaded(img) => Some(img),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether the asset loaded
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Source of asset bytes
#[async_trait]
pub trait AssetStore: Send + Sync + fmt::Debug {
    /// Raw bytes of an asset
    async fn fetch(&self, name: &str) -> std::io::Result<Vec<u8>>;

    /// Load and decode an image asset
    async fn load_image(&self, name: &str) -> AssetOutcome {
        let bytes = match self.fetch(name).await {
            Ok(bytes) => bytes,
            Err(e) => return unavailable(name, format!("read failed: {e}")),
        };
        match image::load_from_memory(&bytes) {
            Ok(img) => AssetOutcome::Loaded(Arc::new(img.to_rgba8())),
            Err(e) => unavailable(name, format!("decode failed: {e}")),
        }
    }
}

fn unavailable(name: &str, reason: String) -> AssetOutcome {
    tracing::warn!(asset = name, %reason, "failed to load image");
    AssetOutcome::Unavailable {
        name: name.to_string(),
        reason,
    }
}

/// Load the TrueType font used for card text
pub async fn load_font(store: &dyn AssetStore, name: &str) -> Option<CardFont> {
    match store.fetch(name).await {
        Ok(bytes) => {
            let font = CardFont::from_bytes(bytes);
            if font.is_none() {
                tracing::warn!(asset = name, "font is not a valid TrueType file");
            }
            font
        }
        Err(e) => {
            tracing::warn!(asset = name, error = %e, "font unavailable, text will not be rasterized");
            None
        }
    }
}

/// Assets read from a directory on disk
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    /// Serve assets from `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn fetch(&self, name: &str) -> std::io::Result<Vec<u8>> {
        if Path::new(name).components().count() != 1 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("asset name must be a plain file name: {name}"),
            ));
        }
        tokio::fs::read(self.root.join(name)).await
    }
}

/// Assets held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemoryAssetStore {
    /// Empty store; every load is unavailable
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw bytes under `name`
    #[must_use]
    pub fn with_bytes(mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.files.insert(name.into(), bytes.into());
        self
    }

    /// Add an image, stored PNG-encoded
    ///
    /// # Errors
    ///
    /// Returns error if the image cannot be encoded
    pub fn with_image(self, name: impl Into<String>, img: &RgbaImage) -> CardResult<Self> {
        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .map_err(|e| CardError::encoding(format!("Failed to encode asset: {e}")))?;
        Ok(self.with_bytes(name, data))
    }

    /// Number of stored assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn fetch(&self, name: &str) -> std::io::Result<Vec<u8>> {
        self.files.get(name).map(|bytes| bytes.to_vec()).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no asset named {name}"))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    mod memory_store_tests {
        use super::*;

        #[tokio::test]
        async fn test_load_stored_image() {
            let store = MemoryAssetStore::new()
                .with_image("logo.png", &solid(4, 3, [1, 2, 3, 255]))
                .unwrap();
            let outcome = store.load_image("logo.png").await;
            let img = outcome.image().unwrap();
            assert_eq!(img.dimensions(), (4, 3));
            assert_eq!(*img.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
        }

        #[tokio::test]
        async fn test_missing_image_is_unavailable() {
            let outcome = MemoryAssetStore::new().load_image("nope.png").await;
            assert!(!outcome.is_loaded());
            let AssetOutcome::Unavailable { name, reason } = outcome else {
                panic!("expected unavailable");
            };
            assert_eq!(name, "nope.png");
            assert!(reason.contains("read failed"));
        }

        #[tokio::test]
        async fn test_corrupt_image_is_unavailable() {
            let store = MemoryAssetStore::new().with_bytes("bad.jpeg", b"not an image".to_vec());
            let outcome = store.load_image("bad.jpeg").await;
            let AssetOutcome::Unavailable { reason, .. } = outcome else {
                panic!("expected unavailable");
            };
            assert!(reason.contains("decode failed"));
        }

        #[tokio::test]
        async fn test_invalid_font_is_none() {
            let store = MemoryAssetStore::new().with_bytes("font.ttf", b"garbage".to_vec());
            assert!(load_font(&store, "font.ttf").await.is_none());
            assert!(load_font(&store, "missing.ttf").await.is_none());
        }
    }

    mod dir_store_tests {
        use super::*;

        #[tokio::test]
        async fn test_reads_from_directory() {
            let dir = tempfile::tempdir().unwrap();
            solid(2, 2, [9, 9, 9, 255])
                .save(dir.path().join("gali_image.jpeg.png"))
                .unwrap();
            let store = DirAssetStore::new(dir.path());
            assert!(store.load_image("gali_image.jpeg.png").await.is_loaded());
            assert!(!store.load_image("gali_image.jpeg").await.is_loaded());
        }

        #[tokio::test]
        async fn test_rejects_nested_paths() {
            let dir = tempfile::tempdir().unwrap();
            let store = DirAssetStore::new(dir.path());
            let err = store.fetch("../secret.png").await.unwrap_err();
            assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        }
    }
}
