//! Video recording through an external `ffmpeg` process.
//!
//! Raw RGBA frames are piped into ffmpeg's stdin and the encoded stream is
//! read back from stdout as chunks. Supported codecs come from
//! `ffmpeg -hide_banner -encoders`, probed once per runtime.

use super::video_recorder::{
    EncoderSettings, RecorderRuntime, VideoCodec, VideoContainer, VideoEncoder, VideoFormat,
};
use crate::result::{CardError, CardResult};
use async_trait::async_trait;
use image::RgbaImage;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

const CHUNK_SIZE: usize = 64 * 1024;

/// Encoders found in `ffmpeg -encoders` output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvailableEncoders {
    /// `libx264`
    pub h264: bool,
    /// `libvpx-vp9`
    pub vp9: bool,
    /// `libvpx`
    pub vp8: bool,
}

impl AvailableEncoders {
    /// Whether `format` can be produced
    #[must_use]
    pub const fn supports(&self, format: &VideoFormat) -> bool {
        match format.codec {
            Some(VideoCodec::H264) => self.h264,
            Some(VideoCodec::Vp9) => self.vp9,
            Some(VideoCodec::Vp8) | None => self.vp8,
        }
    }
}

/// Parse the encoder table printed by `ffmpeg -encoders`
#[must_use]
pub fn parse_encoder_list(output: &str) -> AvailableEncoders {
    let mut found = AvailableEncoders::default();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        let (Some(flags), Some(name)) = (fields.next(), fields.next()) else {
            continue;
        };
        if !flags.starts_with('V') {
            continue;
        }
        match name {
            "libx264" => found.h264 = true,
            "libvpx-vp9" => found.vp9 = true,
            "libvpx" => found.vp8 = true,
            _ => {}
        }
    }
    found
}

fn encoder_name(format: &VideoFormat) -> &'static str {
    match format.codec {
        Some(VideoCodec::H264) => "libx264",
        Some(VideoCodec::Vp9) => "libvpx-vp9",
        Some(VideoCodec::Vp8) | None => "libvpx",
    }
}

/// Build ffmpeg arguments for a raw-RGBA-in, encoded-stream-out pipe
#[must_use]
pub fn build_ffmpeg_args(settings: &EncoderSettings) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    args.push(format!("{}x{}", settings.width, settings.height));
    args.extend([
        "-r".to_string(),
        settings.fps.to_string(),
        "-i".to_string(),
        "pipe:0".to_string(),
        "-vf".to_string(),
        "pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:v".to_string(),
        encoder_name(&settings.format).to_string(),
        "-b:v".to_string(),
        settings.bitrate_bps.to_string(),
    ]);
    match settings.format.container {
        VideoContainer::Mp4 => args.extend(
            ["-movflags", "frag_keyframe+empty_moov", "-f", "mp4"]
                .iter()
                .map(ToString::to_string),
        ),
        VideoContainer::Webm => args.extend(["-f", "webm"].iter().map(ToString::to_string)),
    }
    args.push("pipe:1".to_string());
    args
}

/// Recorder runtime backed by the ffmpeg executable
#[derive(Debug)]
pub struct FfmpegRuntime {
    program: PathBuf,
    encoders: OnceCell<AvailableEncoders>,
}

impl Default for FfmpegRuntime {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRuntime {
    /// Use the given ffmpeg executable
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            encoders: OnceCell::new(),
        }
    }

    /// Encoders this ffmpeg provides; nothing if it cannot be run
    pub async fn encoders(&self) -> AvailableEncoders {
        *self
            .encoders
            .get_or_init(|| async {
                match self.probe().await {
                    Ok(found) => {
                        tracing::debug!(?found, "ffmpeg encoders probed");
                        found
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ffmpeg unavailable, video export disabled");
                        AvailableEncoders::default()
                    }
                }
            })
            .await
    }

    async fn probe(&self) -> CardResult<AvailableEncoders> {
        let output = Command::new(&self.program)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CardError::capability(format!("Failed to execute ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CardError::capability(format!(
                "ffmpeg exited with {}: {stderr}",
                output.status
            )));
        }
        Ok(parse_encoder_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl RecorderRuntime for FfmpegRuntime {
    async fn is_type_supported(&self, mime: &str) -> bool {
        match VideoFormat::from_mime(mime) {
            Some(format) => self.encoders().await.supports(&format),
            None => false,
        }
    }

    async fn start(&self, settings: &EncoderSettings) -> CardResult<Box<dyn VideoEncoder>> {
        let args = build_ffmpeg_args(settings);
        tracing::debug!(program = %self.program.display(), ?args, "starting ffmpeg");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CardError::video(format!("Failed to execute ffmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CardError::video("ffmpeg stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CardError::video("ffmpeg stderr not captured"))?;

        Ok(Box::new(FfmpegEncoder {
            child,
            stdin,
            stdout: tokio::spawn(read_chunks(stdout)),
            stderr: tokio::spawn(read_chunks(stderr)),
            width: settings.width,
            height: settings.height,
        }))
    }
}

async fn read_chunks<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<Vec<Vec<u8>>> {
    let mut chunks = Vec::new();
    loop {
        let mut buf = vec![0_u8; CHUNK_SIZE];
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(chunks);
        }
        buf.truncate(n);
        chunks.push(buf);
    }
}

struct FfmpegEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: JoinHandle<std::io::Result<Vec<Vec<u8>>>>,
    stderr: JoinHandle<std::io::Result<Vec<Vec<u8>>>>,
    width: u32,
    height: u32,
}

async fn join_output(
    handle: &mut JoinHandle<std::io::Result<Vec<Vec<u8>>>>,
) -> CardResult<Vec<Vec<u8>>> {
    handle
        .await
        .map_err(|e| CardError::video(format!("ffmpeg reader task failed: {e}")))?
        .map_err(|e| CardError::video(format!("Failed to read ffmpeg output: {e}")))
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn push_frame(&mut self, frame: &RgbaImage) -> CardResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(CardError::video(format!(
                "Frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CardError::video("ffmpeg input already closed"))?;
        stdin
            .write_all(frame.as_raw())
            .await
            .map_err(|e| CardError::video(format!("Failed to write frame to ffmpeg: {e}")))
    }

    async fn finish(&mut self) -> CardResult<Vec<Vec<u8>>> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin
                .shutdown()
                .await
                .map_err(|e| CardError::video(format!("Failed to close ffmpeg input: {e}")))?;
        }
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| CardError::video(format!("Failed to wait for ffmpeg: {e}")))?;
        let chunks = join_output(&mut self.stdout).await?;
        let stderr = join_output(&mut self.stderr).await?.concat();

        if !status.success() {
            return Err(CardError::video(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(chunks)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::media::video_recorder::{negotiate, CANDIDATE_FORMATS};

    const ENCODERS: &str = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D libvpx               libvpx VP8 (codec vp8)
 A....D libopus              libopus Opus (codec opus)
";

    fn settings(index: usize) -> EncoderSettings {
        EncoderSettings {
            format: CANDIDATE_FORMATS[index],
            width: 700,
            height: 500,
            fps: 30,
            bitrate_bps: 2_500_000,
        }
    }

    #[test]
    fn test_parse_encoder_list() {
        let found = parse_encoder_list(ENCODERS);
        assert_eq!(
            found,
            AvailableEncoders {
                h264: true,
                vp9: false,
                vp8: true
            }
        );
        assert!(found.supports(&CANDIDATE_FORMATS[0]));
        assert!(!found.supports(&CANDIDATE_FORMATS[1]));
        assert!(found.supports(&CANDIDATE_FORMATS[3]));
    }

    #[test]
    fn test_legend_lines_are_ignored() {
        let found = parse_encoder_list(" V..... = Video\n A....D libvpx-vp9 fake\n");
        assert_eq!(found, AvailableEncoders::default());
    }

    #[test]
    fn test_mp4_args() {
        let args = build_ffmpeg_args(&settings(0));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 700x500 -r 30 -i pipe:0"));
        assert!(joined.contains("-c:v libx264 -b:v 2500000"));
        assert!(joined.contains("-movflags frag_keyframe+empty_moov -f mp4"));
        assert_eq!(args.last().unwrap(), "pipe:1");
    }

    #[test]
    fn test_webm_args() {
        let joined = build_ffmpeg_args(&settings(1)).join(" ");
        assert!(joined.contains("-c:v libvpx-vp9"));
        assert!(joined.ends_with("-f webm pipe:1"));
        assert!(build_ffmpeg_args(&settings(3)).join(" ").contains("-c:v libvpx "));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_supports_nothing() {
        let runtime = FfmpegRuntime::new("/nonexistent/khelcard-ffmpeg");
        assert_eq!(runtime.encoders().await, AvailableEncoders::default());
        assert!(negotiate(&runtime).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_mime_is_unsupported() {
        let runtime = FfmpegRuntime::new("/nonexistent/khelcard-ffmpeg");
        assert!(!runtime.is_type_supported("video/ogg").await);
    }
}
