//! PNG export of the composed card.

use super::download::DownloadTarget;
use crate::calendar::CalendarDay;
use crate::compositor::CardCompositor;
use crate::result::{CardError, CardResult};
use crate::selection::{ResultForm, ResultSelection};
use crate::session::{ExportControl, ExportGate, Notifier};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Idle label of the PNG button
pub const PNG_IDLE_LABEL: &str = "Generate PNG";
/// Busy label of the PNG button
pub const PNG_BUSY_LABEL: &str = "Generating PNG...";
/// Alert shown when a PNG export fails
pub const PNG_ERROR_ALERT: &str = "Error generating PNG. Please try again.";

/// PNG compression level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Fast compression
    Fast,
    /// Default compression
    #[default]
    Default,
    /// Best compression (slowest, smallest files)
    Best,
}

impl CompressionLevel {
    fn to_png_compression(self) -> png::Compression {
        match self {
            Self::Fast => png::Compression::Fast,
            Self::Default => png::Compression::Default,
            Self::Best => png::Compression::Best,
        }
    }
}

/// Text chunks written into the PNG
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PngMetadata {
    /// Image title
    pub title: Option<String>,
    /// Image description
    pub description: Option<String>,
    /// Creation date
    pub creation_time: Option<String>,
    /// Software that generated the image
    pub software: Option<String>,
}

impl PngMetadata {
    /// Metadata describing one result card
    #[must_use]
    pub fn for_card(selection: &ResultSelection, day: CalendarDay) -> Self {
        let code = selection
            .game_code
            .as_ref()
            .map_or("-", |code| code.as_str());
        Self {
            title: Some(format!("Result {} {code}", selection.number_text())),
            description: selection.custom_label.clone(),
            creation_time: Some(day.iso()),
            software: Some("khelcard".to_string()),
        }
    }

    fn chunks(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Title", self.title.as_deref()),
            ("Description", self.description.as_deref()),
            ("Creation Time", self.creation_time.as_deref()),
            ("Software", self.software.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
    }
}

/// RGBA to PNG encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder {
    compression: CompressionLevel,
}

impl PngEncoder {
    /// Encoder with default compression
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression level
    #[must_use]
    pub const fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Current compression level
    #[must_use]
    pub const fn compression(&self) -> CompressionLevel {
        self.compression
    }

    /// Encode an image with metadata text chunks
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn encode(&self, img: &RgbaImage, metadata: &PngMetadata) -> CardResult<Vec<u8>> {
        let (width, height) = img.dimensions();
        let mut output = Vec::new();

        {
            let mut encoder = png::Encoder::new(&mut output, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(self.compression.to_png_compression());
            for (keyword, text) in metadata.chunks() {
                encoder
                    .add_text_chunk(keyword.to_string(), text.to_string())
                    .map_err(|e| CardError::encoding(format!("Failed to add PNG text: {e}")))?;
            }

            let mut writer = encoder
                .write_header()
                .map_err(|e| CardError::encoding(format!("Failed to write PNG header: {e}")))?;

            writer
                .write_image_data(img.as_raw())
                .map_err(|e| CardError::encoding(format!("Failed to write PNG data: {e}")))?;
        }

        Ok(output)
    }
}

/// Download name for a PNG export
#[must_use]
pub fn png_file_name(selection: &ResultSelection, day: CalendarDay) -> String {
    let code = selection
        .game_code
        .as_ref()
        .map_or("", |code| code.as_str());
    format!(
        "Sri_Ganesh_Result_{}_{code}_{}.png",
        selection.number_text(),
        day.iso()
    )
}

/// A finished PNG export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngExport {
    /// Download name
    pub file_name: String,
    /// Where the download landed
    pub location: PathBuf,
    /// Encoded size
    pub size: usize,
}

/// Validates, composes, encodes and delivers the card as PNG
#[derive(Debug, Clone)]
pub struct ImageExporter {
    compositor: Arc<CardCompositor>,
    encoder: PngEncoder,
    downloads: Arc<dyn DownloadTarget>,
    notifier: Arc<dyn Notifier>,
    gate: ExportGate,
    control: ExportControl,
}

impl ImageExporter {
    /// Create an exporter on the process-wide gate, with its own control
    #[must_use]
    pub fn new(
        compositor: Arc<CardCompositor>,
        downloads: Arc<dyn DownloadTarget>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            compositor,
            encoder: PngEncoder::new(),
            downloads,
            notifier,
            gate: ExportGate::global(),
            control: ExportControl::new(PNG_IDLE_LABEL),
        }
    }

    /// Set the PNG encoder
    #[must_use]
    pub const fn with_encoder(mut self, encoder: PngEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Use a different gate than the process-wide one
    #[must_use]
    pub fn with_gate(mut self, gate: ExportGate) -> Self {
        self.gate = gate;
        self
    }

    /// The PNG button
    #[must_use]
    pub fn control(&self) -> &ExportControl {
        &self.control
    }

    /// Export the form's card as a PNG download
    ///
    /// # Errors
    ///
    /// Returns a validation error before any work if the form is incomplete,
    /// `Busy` if another export runs, or the encoding/delivery failure
    pub async fn export_png(&self, form: &ResultForm, day: CalendarDay) -> CardResult<PngExport> {
        let selection = form.validate()?;
        let _permit = self.gate.try_acquire()?;
        let _control = self.control.begin(PNG_BUSY_LABEL);

        match self.render_and_deliver(&selection, day).await {
            Ok(export) => {
                tracing::info!(
                    file = %export.file_name,
                    bytes = export.size,
                    "PNG export complete"
                );
                Ok(export)
            }
            Err(e) => {
                tracing::error!(error = %e, "PNG export failed");
                self.notifier.alert(PNG_ERROR_ALERT);
                Err(e)
            }
        }
    }

    async fn render_and_deliver(
        &self,
        selection: &ResultSelection,
        day: CalendarDay,
    ) -> CardResult<PngExport> {
        let card = self.compositor.compose(selection, day).await?;
        let bytes = self
            .encoder
            .encode(card.image(), &PngMetadata::for_card(selection, day))?;
        let file_name = png_file_name(selection, day);
        let location = self.downloads.save(&file_name, &bytes).await?;
        Ok(PngExport {
            file_name,
            location,
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use crate::catalog::GameCatalog;
    use crate::media::download::MemoryDownloads;
    use crate::session::RecordingNotifier;
    use async_trait::async_trait;
    use image::Rgba;
    use std::path::Path;

    fn day() -> CalendarDay {
        CalendarDay::from_ymd(2026, 10, 19).unwrap()
    }

    fn compositor() -> Arc<CardCompositor> {
        Arc::new(CardCompositor::new(
            Arc::new(GameCatalog::standard()),
            Arc::new(MemoryAssetStore::new()),
        ))
    }

    mod encoder_tests {
        use super::*;

        #[test]
        fn test_encode_decodes_back() {
            let img = RgbaImage::from_pixel(12, 7, Rgba([10, 20, 30, 255]));
            let bytes = PngEncoder::new().encode(&img, &PngMetadata::default()).unwrap();
            assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
            let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
            assert_eq!(decoded, img);
        }

        #[test]
        fn test_metadata_is_embedded() {
            let img = RgbaImage::new(2, 2);
            let selection = ResultForm::new("7", "S", "").validate().unwrap();
            let bytes = PngEncoder::new()
                .encode(&img, &PngMetadata::for_card(&selection, day()))
                .unwrap();
            assert!(bytes.windows(8).any(|w| w == b"khelcard"));
            assert!(bytes.windows(10).any(|w| w == b"2026-10-19"));
        }

        #[test]
        fn test_compression_levels_decode_identically() {
            let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, 0, 255]));
            for level in [CompressionLevel::Fast, CompressionLevel::Default, CompressionLevel::Best] {
                let encoder = PngEncoder::new().with_compression(level);
                assert_eq!(encoder.compression(), level);
                let bytes = encoder.encode(&img, &PngMetadata::default()).unwrap();
                assert_eq!(image::load_from_memory(&bytes).unwrap().to_rgba8(), img);
            }
        }
    }

    mod file_name_tests {
        use super::*;

        #[test]
        fn test_png_file_name() {
            let selection = ResultForm::new("7", "S", "").validate().unwrap();
            assert_eq!(
                png_file_name(&selection, day()),
                "Sri_Ganesh_Result_07_S_2026-10-19.png"
            );
            let selection = ResultForm::new("100", "m", "").validate().unwrap();
            assert_eq!(
                png_file_name(&selection, day()),
                "Sri_Ganesh_Result_100_M_2026-10-19.png"
            );
        }
    }

    mod exporter_tests {
        use super::*;

        #[derive(Debug)]
        struct FailingDownloads;

        #[async_trait]
        impl DownloadTarget for FailingDownloads {
            async fn save(&self, _file_name: &str, _bytes: &[u8]) -> CardResult<PathBuf> {
                Err(CardError::Io(std::io::Error::other("disk full")))
            }
        }

        #[tokio::test]
        async fn test_export_delivers_png() {
            let downloads = MemoryDownloads::new();
            let notifier = RecordingNotifier::new();
            let exporter = ImageExporter::new(
                compositor(),
                Arc::new(downloads.clone()),
                Arc::new(notifier.clone()),
            )
            .with_gate(ExportGate::new());

            let export = exporter
                .export_png(&ResultForm::new("7", "S", ""), day())
                .await
                .unwrap();

            assert_eq!(export.file_name, "Sri_Ganesh_Result_07_S_2026-10-19.png");
            let files = downloads.files();
            assert_eq!(files.len(), 1);
            let img = image::load_from_memory(&files[0].1).unwrap();
            assert_eq!((img.width(), img.height()), (1400, 1000));
            assert!(notifier.messages().is_empty());
            assert_eq!(exporter.control().label(), PNG_IDLE_LABEL);
        }

        #[tokio::test]
        async fn test_invalid_form_aborts_before_work() {
            let downloads = MemoryDownloads::new();
            let notifier = RecordingNotifier::new();
            let exporter = ImageExporter::new(
                compositor(),
                Arc::new(downloads.clone()),
                Arc::new(notifier.clone()),
            )
            .with_gate(ExportGate::new());

            let err = exporter
                .export_png(&ResultForm::new("101", "S", ""), day())
                .await
                .unwrap_err();

            assert!(matches!(err, CardError::Validation { field: "number", .. }));
            assert!(downloads.files().is_empty());
            assert!(notifier.messages().is_empty());
        }

        #[tokio::test]
        async fn test_delivery_failure_alerts_and_restores_control() {
            let notifier = RecordingNotifier::new();
            let exporter = ImageExporter::new(
                compositor(),
                Arc::new(FailingDownloads),
                Arc::new(notifier.clone()),
            )
            .with_gate(ExportGate::new());

            let err = exporter
                .export_png(&ResultForm::new("3", "E", ""), day())
                .await
                .unwrap_err();

            assert!(matches!(err, CardError::Io(_)));
            assert_eq!(notifier.messages(), vec![PNG_ERROR_ALERT]);
            assert!(exporter.control().is_enabled());
            assert_eq!(exporter.control().label(), PNG_IDLE_LABEL);
        }

        #[tokio::test]
        async fn test_busy_gate_rejects_export() {
            let gate = ExportGate::new();
            let exporter = ImageExporter::new(
                compositor(),
                Arc::new(MemoryDownloads::new()),
                Arc::new(RecordingNotifier::new()),
            )
            .with_gate(gate.clone());

            let _held = gate.try_acquire().unwrap();
            let err = exporter
                .export_png(&ResultForm::new("3", "E", ""), day())
                .await
                .unwrap_err();
            assert!(matches!(err, CardError::Busy));
        }

        #[tokio::test]
        async fn test_directory_download_location() {
            let dir = tempfile::tempdir().unwrap();
            let exporter = ImageExporter::new(
                compositor(),
                Arc::new(crate::media::DirectoryDownloads::new(dir.path())),
                Arc::new(RecordingNotifier::new()),
            )
            .with_gate(ExportGate::new())
            .with_encoder(PngEncoder::new().with_compression(CompressionLevel::Fast));

            let export = exporter
                .export_png(&ResultForm::new("42", "K", ""), day())
                .await
                .unwrap();
            assert_eq!(
                export.location,
                dir.path().join("Sri_Ganesh_Result_42_K_2026-10-19.png")
            );
            assert!(Path::new(&export.location).exists());
        }
    }
}
