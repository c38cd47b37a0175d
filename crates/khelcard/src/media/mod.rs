//! Export of the result card as PNG image or video clip.

mod download;
#[cfg(feature = "ffmpeg")]
mod ffmpeg;
mod frame_source;
mod png_exporter;
mod video_recorder;

pub use download::{BlobRegistry, DirectoryDownloads, DownloadTarget, MemoryDownloads, ObjectUrl};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{build_ffmpeg_args, parse_encoder_list, AvailableEncoders, FfmpegRuntime};
pub use frame_source::{CardFrameSource, FrameSource};
pub use png_exporter::{
    png_file_name, CompressionLevel, ImageExporter, PngEncoder, PngExport, PngMetadata,
    PNG_BUSY_LABEL, PNG_ERROR_ALERT, PNG_IDLE_LABEL,
};
pub use video_recorder::{
    negotiate, video_file_name, CaptureGeometry, EncoderSettings, RecorderRuntime,
    RecordingProgress, VideoCodec, VideoContainer, VideoEncoder, VideoExport, VideoExporter,
    VideoFormat, VideoSettings, VideoState, CANDIDATE_FORMATS, MOBILE_BREAKPOINT, MOBILE_SCALE,
    VIDEO_BUSY_LABEL, VIDEO_IDLE_LABEL,
};
