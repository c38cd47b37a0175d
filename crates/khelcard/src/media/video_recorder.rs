//! Time-bounded video capture of the preview region.
//!
//! The exporter negotiates a container/codec with a `RecorderRuntime`, then
//! repeatedly rasterizes a `FrameSource` onto a fixed-size surface and feeds
//! the encoder enough frames to cover the elapsed time. Recording stops at
//! the configured duration, measured on the monotonic clock.
//!
//! ## State machine
//!
//! `Idle -> Negotiating -> Recording -> Finalizing -> Idle`. Every exit path,
//! error or not, returns to `Idle`.

use super::download::{BlobRegistry, DownloadTarget};
use super::frame_source::FrameSource;
use crate::calendar::CalendarDay;
use crate::color::palette;
use crate::config::VideoSection;
use crate::result::{CardError, CardResult};
use crate::selection::ResultForm;
use crate::session::{ExportControl, ExportGate, Notifier};
use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Idle label of the video button
pub const VIDEO_IDLE_LABEL: &str = "Generate Video";
/// Busy label of the video button
pub const VIDEO_BUSY_LABEL: &str = "Recording Video...";
/// Viewports at or below this width record a smaller region
pub const MOBILE_BREAKPOINT: u32 = 768;
/// Region scale on narrow viewports
pub const MOBILE_SCALE: f32 = 0.8;

/// Video container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VideoContainer {
    /// MPEG-4
    Mp4,
    /// WebM
    Webm,
}

impl VideoContainer {
    /// File extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// Upper-case name used in the success alert
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Webm => "WEBM",
        }
    }
}

/// Video codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VideoCodec {
    /// H.264 / AVC
    H264,
    /// VP9
    Vp9,
    /// VP8
    Vp8,
}

/// A recordable MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VideoFormat {
    /// MIME type with optional codecs parameter
    pub mime: &'static str,
    /// Container
    pub container: VideoContainer,
    /// Explicit codec; `None` leaves the choice to the runtime
    pub codec: Option<VideoCodec>,
}

/// Formats in order of preference
pub const CANDIDATE_FORMATS: [VideoFormat; 4] = [
    VideoFormat {
        mime: "video/mp4;codecs=h264",
        container: VideoContainer::Mp4,
        codec: Some(VideoCodec::H264),
    },
    VideoFormat {
        mime: "video/webm;codecs=vp9",
        container: VideoContainer::Webm,
        codec: Some(VideoCodec::Vp9),
    },
    VideoFormat {
        mime: "video/webm;codecs=vp8",
        container: VideoContainer::Webm,
        codec: Some(VideoCodec::Vp8),
    },
    VideoFormat {
        mime: "video/webm",
        container: VideoContainer::Webm,
        codec: None,
    },
];

impl VideoFormat {
    /// Candidate format for a MIME string
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        CANDIDATE_FORMATS.into_iter().find(|f| f.mime == mime)
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime)
    }
}

/// Download name for a video export
#[must_use]
pub fn video_file_name(container: VideoContainer, day: CalendarDay) -> String {
    format!("Sri_Ganesh_Result_Video_{}.{}", day.iso(), container.extension())
}

/// Parameters handed to the runtime when an encoder is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Negotiated format
    pub format: VideoFormat,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Frames per second
    pub fps: u32,
    /// Target bitrate
    pub bitrate_bps: u64,
}

/// A media recording backend
#[async_trait]
pub trait RecorderRuntime: Send + Sync + fmt::Debug {
    /// Whether the runtime can record `mime`
    async fn is_type_supported(&self, mime: &str) -> bool;

    /// Start an encoder
    async fn start(&self, settings: &EncoderSettings) -> CardResult<Box<dyn VideoEncoder>>;
}

/// A running encoder
#[async_trait]
pub trait VideoEncoder: Send {
    /// Append one frame
    async fn push_frame(&mut self, frame: &RgbaImage) -> CardResult<()>;

    /// Stop and return the encoded chunks in order
    async fn finish(&mut self) -> CardResult<Vec<Vec<u8>>>;
}

/// First candidate format the runtime supports
pub async fn negotiate(runtime: &dyn RecorderRuntime) -> Option<VideoFormat> {
    for format in CANDIDATE_FORMATS {
        if runtime.is_type_supported(format.mime).await {
            tracing::debug!(mime = format.mime, "video format selected");
            return Some(format);
        }
    }
    None
}

/// Size of the recorded surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureGeometry {
    /// Preview region width
    pub region_width: u32,
    /// Preview region height
    pub region_height: u32,
    /// Viewport width
    pub viewport_width: u32,
}

impl CaptureGeometry {
    /// Whether the viewport counts as mobile
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.viewport_width <= MOBILE_BREAKPOINT
    }

    /// Destination surface size, never below 1x1
    #[must_use]
    pub fn surface_size(&self) -> (u32, u32) {
        let (width, height) = if self.is_mobile() {
            (
                (self.region_width as f32 * MOBILE_SCALE) as u32,
                (self.region_height as f32 * MOBILE_SCALE) as u32,
            )
        } else {
            (self.region_width, self.region_height)
        };
        (width.max(1), height.max(1))
    }
}

/// Recording parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSettings {
    /// Recording length
    pub duration: Duration,
    /// Frames per second
    pub fps: u32,
    /// Target bitrate
    pub bitrate_bps: u64,
    /// Surface geometry
    pub geometry: CaptureGeometry,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self::from_section(&VideoSection::default())
    }
}

impl VideoSettings {
    /// Settings from the configuration file section
    #[must_use]
    pub fn from_section(section: &VideoSection) -> Self {
        Self {
            duration: section.duration(),
            fps: section.fps.max(1),
            bitrate_bps: section.bitrate_bps,
            geometry: CaptureGeometry {
                region_width: section.region_width,
                region_height: section.region_height,
                viewport_width: section.viewport_width,
            },
        }
    }

    /// Time between frames
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// Frames in a complete recording
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        (self.duration.as_secs_f64() * f64::from(self.fps)).round() as u64
    }

    /// Frames that should have been emitted after `elapsed`
    #[must_use]
    pub fn frames_due(&self, elapsed: Duration) -> u64 {
        let due = (elapsed.as_secs_f64() * f64::from(self.fps)).floor() as u64 + 1;
        due.min(self.total_frames())
    }
}

/// Exporter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VideoState {
    /// Nothing running
    #[default]
    Idle,
    /// Choosing a format
    Negotiating,
    /// Capturing frames
    Recording,
    /// Encoding the tail and delivering the file
    Finalizing,
}

/// Snapshot of a running export, for progress displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecordingProgress {
    /// Current state
    pub state: VideoState,
    /// Frames handed to the encoder
    pub frames: u64,
    /// Time since recording started
    pub elapsed: Duration,
}

/// A finished video export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoExport {
    /// Download name
    pub file_name: String,
    /// Where the download landed
    pub location: PathBuf,
    /// Negotiated format
    pub format: VideoFormat,
    /// Frames encoded
    pub frames: u64,
    /// Encoded size
    pub size: usize,
}

/// Records the preview region and delivers the clip
#[derive(Debug)]
pub struct VideoExporter {
    runtime: Arc<dyn RecorderRuntime>,
    downloads: Arc<dyn DownloadTarget>,
    notifier: Arc<dyn Notifier>,
    blobs: BlobRegistry,
    gate: ExportGate,
    control: ExportControl,
    settings: VideoSettings,
    progress: watch::Sender<RecordingProgress>,
}

/// Puts the exporter back to `Idle` on every exit path
struct IdleOnDrop<'a>(&'a watch::Sender<RecordingProgress>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|p| p.state = VideoState::Idle);
    }
}

enum Failure {
    Setup(CardError),
    Recording(CardError),
}

impl VideoExporter {
    /// Create an exporter with default settings on the process-wide gate
    #[must_use]
    pub fn new(
        runtime: Arc<dyn RecorderRuntime>,
        downloads: Arc<dyn DownloadTarget>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            runtime,
            downloads,
            notifier,
            blobs: BlobRegistry::new(),
            gate: ExportGate::global(),
            control: ExportControl::new(VIDEO_IDLE_LABEL),
            settings: VideoSettings::default(),
            progress: watch::Sender::new(RecordingProgress::default()),
        }
    }

    /// Set recording parameters
    #[must_use]
    pub const fn with_settings(mut self, settings: VideoSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a different gate than the process-wide one
    #[must_use]
    pub fn with_gate(mut self, gate: ExportGate) -> Self {
        self.gate = gate;
        self
    }

    /// Use a shared blob registry
    #[must_use]
    pub fn with_blobs(mut self, blobs: BlobRegistry) -> Self {
        self.blobs = blobs;
        self
    }

    /// Recording parameters
    #[must_use]
    pub const fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> VideoState {
        self.progress.borrow().state
    }

    /// Watch state and frame count
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RecordingProgress> {
        self.progress.subscribe()
    }

    /// The video button
    #[must_use]
    pub fn control(&self) -> &ExportControl {
        &self.control
    }

    /// Record `source` for the configured duration and deliver the clip
    ///
    /// # Errors
    ///
    /// Returns a validation error before any work if the form is incomplete,
    /// `Busy` if another export runs, `Capability` if no format is
    /// supported, or the recording/delivery failure
    pub async fn export_video(
        &self,
        form: &ResultForm,
        source: &dyn FrameSource,
        day: CalendarDay,
    ) -> CardResult<VideoExport> {
        form.validate()?;
        let _permit = self.gate.try_acquire()?;
        let _control = self.control.begin(VIDEO_BUSY_LABEL);
        let _idle = IdleOnDrop(&self.progress);

        match self.run(source, day).await {
            Ok(export) => {
                tracing::info!(
                    file = %export.file_name,
                    format = %export.format,
                    frames = export.frames,
                    bytes = export.size,
                    "video export complete"
                );
                self.notifier.alert(&format!(
                    "Video generated successfully! Format: {}",
                    export.format.container.label()
                ));
                Ok(export)
            }
            Err(Failure::Setup(e)) => {
                tracing::error!(error = %e, "video export failed");
                self.notifier
                    .alert(&format!("Error generating video: {}", alert_text(&e)));
                Err(e)
            }
            Err(Failure::Recording(e)) => {
                tracing::error!(error = %e, "video recording failed");
                self.notifier
                    .alert(&format!("Error recording video: {}", alert_text(&e)));
                Err(e)
            }
        }
    }

    async fn run(&self, source: &dyn FrameSource, day: CalendarDay) -> Result<VideoExport, Failure> {
        self.set_state(VideoState::Negotiating);
        let format = negotiate(self.runtime.as_ref())
            .await
            .ok_or_else(|| Failure::Setup(CardError::capability("No supported video format found")))?;

        let (width, height) = self.settings.geometry.surface_size();
        let encoder_settings = EncoderSettings {
            format,
            width,
            height,
            fps: self.settings.fps,
            bitrate_bps: self.settings.bitrate_bps,
        };
        let mut encoder = self
            .runtime
            .start(&encoder_settings)
            .await
            .map_err(Failure::Setup)?;

        self.set_state(VideoState::Recording);
        let frames = self
            .capture(source, encoder.as_mut(), width, height)
            .await
            .map_err(Failure::Recording)?;

        self.set_state(VideoState::Finalizing);
        let chunks = encoder.finish().await.map_err(Failure::Recording)?;
        let blob: Vec<u8> = chunks.concat();
        let size = blob.len();

        let url = self.blobs.register(blob);
        let file_name = video_file_name(format.container, day);
        let location = self
            .downloads
            .save(&file_name, url.bytes())
            .await
            .map_err(Failure::Setup)?;
        drop(url);

        Ok(VideoExport {
            file_name,
            location,
            format,
            frames,
            size,
        })
    }

    async fn capture(
        &self,
        source: &dyn FrameSource,
        encoder: &mut dyn VideoEncoder,
        width: u32,
        height: u32,
    ) -> CardResult<u64> {
        let settings = self.settings;
        let total = settings.total_frames();
        let mut surface = RgbaImage::from_pixel(width, height, palette::WHITE.to_rgba());

        let mut ticker = tokio::time::interval(settings.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let started = Instant::now();
        let mut pushed = 0_u64;

        loop {
            ticker.tick().await;
            if started.elapsed() >= settings.duration {
                break;
            }

            match source.rasterize(width, height).await {
                Ok(frame) if frame.dimensions() == (width, height) => surface = frame,
                Ok(frame) => {
                    surface = imageops::resize(&frame, width, height, FilterType::Triangle);
                }
                Err(e) => tracing::warn!(error = %e, "frame capture failed, reusing last frame"),
            }

            let due = settings.frames_due(started.elapsed().min(settings.duration));
            while pushed < due {
                encoder.push_frame(&surface).await?;
                pushed += 1;
            }
            self.report(pushed, started.elapsed());
        }

        while pushed < total {
            encoder.push_frame(&surface).await?;
            pushed += 1;
        }
        self.report(pushed, started.elapsed().min(settings.duration));
        Ok(pushed)
    }

    fn set_state(&self, state: VideoState) {
        tracing::debug!(?state, "video exporter state");
        self.progress.send_modify(|p| {
            p.state = state;
            if state == VideoState::Negotiating {
                p.frames = 0;
                p.elapsed = Duration::ZERO;
            }
        });
    }

    fn report(&self, frames: u64, elapsed: Duration) {
        self.progress.send_modify(|p| {
            p.frames = frames;
            p.elapsed = elapsed;
        });
    }
}

/// The bare message of an error, without the variant prefix
fn alert_text(err: &CardError) -> String {
    match err {
        CardError::Capability { message }
        | CardError::VideoRecording { message }
        | CardError::Encoding { message }
        | CardError::Config { message } => message.clone(),
        other => other.to_string(),
    }
}
