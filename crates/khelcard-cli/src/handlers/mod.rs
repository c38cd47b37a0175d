//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains the execution logic for one CLI command,
//! plus the pure helpers it needs and their tests.

pub mod catalog;
pub mod png;
pub mod preview;
pub mod video;

pub use catalog::{catalog_lines, execute_catalog};
pub use png::execute_png;
pub use preview::{execute_preview, PreviewReport};
pub use video::{execute_video, state_message};

use crate::error::{CliError, CliResult};
use khelcard::{
    load_font, AssetStore, CalendarDay, CardCompositor, CardConfig, DirAssetStore, GameCatalog,
};
use std::sync::Arc;

/// Card day from `--date`, or today
///
/// # Errors
///
/// Returns error if the date is not `YYYY-MM-DD`
pub fn parse_day(raw: Option<&str>) -> CliResult<CalendarDay> {
    match raw {
        None => Ok(CalendarDay::today()),
        Some(raw) => CalendarDay::parse_iso(raw).ok_or_else(|| {
            CliError::invalid_argument(format!("Date must be YYYY-MM-DD, got '{raw}'"))
        }),
    }
}

/// Compositor over the configured asset directory, with font and branding
///
/// A configured font that fails to load falls back to the bundled one.
pub async fn build_compositor(card: &CardConfig) -> Arc<CardCompositor> {
    let assets: Arc<dyn AssetStore> = Arc::new(DirAssetStore::new(&card.asset_dir));
    let font = match card.font.as_deref() {
        Some(name) => {
            let font = load_font(assets.as_ref(), name).await;
            if font.is_none() {
                tracing::warn!(font = name, "font not loaded, using the bundled font");
            }
            font
        }
        None => None,
    };

    let mut compositor = CardCompositor::new(Arc::new(GameCatalog::standard()), assets)
        .with_title(card.title.clone())
        .with_logo(card.logo.clone());
    if let Some(font) = font {
        compositor = compositor.with_font(font);
    }
    Arc::new(compositor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        let day = parse_day(Some("2026-10-19")).unwrap();
        assert_eq!(day.iso(), "2026-10-19");
    }

    #[test]
    fn test_parse_day_rejects_garbage() {
        let err = parse_day(Some("19/10/2026")).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn test_missing_font_falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let card = CardConfig {
            asset_dir: dir.path().to_path_buf(),
            font: Some("missing.ttf".to_string()),
            ..CardConfig::default()
        };
        let compositor = build_compositor(&card).await;
        assert!(compositor.has_font());
        assert_eq!(compositor.catalog().entries().len(), 10);
    }

    #[tokio::test]
    async fn test_default_config_has_font() {
        let dir = tempfile::tempdir().unwrap();
        let card = CardConfig {
            asset_dir: dir.path().to_path_buf(),
            ..CardConfig::default()
        };
        assert!(card.font.is_none());
        assert!(build_compositor(&card).await.has_font());
    }
}
