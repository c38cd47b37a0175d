//! Khelcard: result-card compositing with PNG and video export
//!
//! A user picks a game code and a result number (1 to 100). Khelcard shows a
//! live preview of the styled result card, composes the full 1400x1000 card
//! and exports it as a PNG image or as a short video clip of the preview.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ ResultForm   │──►│ GameCatalog  │──►│ Preview      │──►│ CardFrame    │
//! │ (validation) │   │ Illustration │   │ Renderer     │   │ Source       │
//! └──────────────┘   └──────┬───────┘   └──────────────┘   └──────┬───────┘
//!                           │                                     │
//!                    ┌──────▼───────┐   ┌──────────────┐   ┌──────▼───────┐
//!                    │ Card         │──►│ ImageExporter│   │ VideoExporter│
//!                    │ Compositor   │   │ (PNG)        │   │ (ffmpeg)     │
//!                    └──────────────┘   └──────┬───────┘   └──────┬───────┘
//!                                              └──► DownloadTarget ◄┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use khelcard::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> CardResult<()> {
//! let compositor = Arc::new(CardCompositor::new(
//!     Arc::new(GameCatalog::standard()),
//!     Arc::new(DirAssetStore::new("assets")),
//! ));
//! let exporter = ImageExporter::new(
//!     compositor,
//!     Arc::new(DirectoryDownloads::new("out")),
//!     Arc::new(TracingNotifier),
//! );
//! let export = exporter
//!     .export_png(&ResultForm::new("7", "S", ""), CalendarDay::today())
//!     .await?;
//! println!("{}", export.location.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assets;
mod calendar;
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
mod canvas;
mod catalog;
mod color;
#[allow(clippy::cast_precision_loss)]
mod compositor;
mod config;
mod illustration;
mod preview;
mod result;
mod selection;
mod session;

/// PNG and video export
#[allow(
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub mod media;

pub use assets::{load_font, AssetOutcome, AssetStore, DirAssetStore, MemoryAssetStore};
pub use calendar::CalendarDay;
pub use canvas::{Canvas, CardFont, DrawOp, Point, Rect, RenderedCard, Shadow, TextStyle};
pub use catalog::{resolve_display, DisplayIdentity, GameCatalog, GameEntry};
pub use color::{palette, Rgb};
pub use compositor::{
    CardCompositor, CARD_HEIGHT, CARD_WIDTH, DECORATIONS, DEFAULT_TITLE, LOGO_ASSET,
};
pub use config::{CardConfig, PngSection, VideoSection};
pub use illustration::{
    FixedChoice, Illustration, IllustrationPicker, RandomChoice, ThreadRandom,
    SHRI_GANESH_VARIANTS,
};
pub use preview::{
    theme_class, PreviewRenderer, PreviewState, PreviewView, TextSlot, TextSlotName, EMPTY_TEXT,
};
pub use result::{CardError, CardResult, ErrorKind};
pub use selection::{
    format_number, GameCode, ResultForm, ResultNumber, ResultSelection, MAX_NUMBER, MIN_NUMBER,
};
pub use session::{
    ControlGuard, ExportControl, ExportGate, ExportPermit, Notifier, RecordingNotifier,
    TracingNotifier,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::media::{
        CardFrameSource, DirectoryDownloads, DownloadTarget, FrameSource, ImageExporter,
        RecorderRuntime, VideoExporter, VideoSettings, VideoState,
    };
    #[cfg(feature = "ffmpeg")]
    pub use super::media::FfmpegRuntime;
    pub use super::{
        CalendarDay, CardCompositor, CardConfig, CardError, CardResult, DirAssetStore,
        ExportGate, GameCatalog, IllustrationPicker, Notifier, PreviewRenderer, PreviewView,
        ResultForm, ResultSelection, TracingNotifier,
    };
}
