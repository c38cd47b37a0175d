//! Video export command handler.
//!
//! Orchestrates: render preview -> negotiate format -> record with a live
//! progress bar -> save the clip.

use crate::commands::VideoArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::{build_compositor, parse_day};
use crate::output::{format_size, ConsoleNotifier, ProgressReporter};
use khelcard::media::{
    CardFrameSource, DirectoryDownloads, FfmpegRuntime, VideoExport, VideoExporter,
    VideoSettings, VideoState,
};
use khelcard::{CardConfig, ExportGate, IllustrationPicker, PreviewRenderer, PreviewView};
use std::sync::Arc;

/// Apply command-line overrides on top of the loaded configuration
#[must_use]
pub fn effective_config(base: &CardConfig, args: &VideoArgs) -> CardConfig {
    let mut card = base.clone();
    if let Some(ref output) = args.output {
        card.output_dir.clone_from(output);
    }
    if let Some(ref assets) = args.assets {
        card.asset_dir.clone_from(assets);
    }
    if let Some(duration) = args.duration {
        card.video.duration_secs = duration;
    }
    if let Some(width) = args.viewport_width {
        card.video.viewport_width = width;
    }
    if let Some(ref ffmpeg) = args.ffmpeg {
        card.video.ffmpeg.clone_from(ffmpeg);
    }
    card
}

/// Progress bar message for an exporter state
#[must_use]
pub const fn state_message(state: VideoState) -> &'static str {
    match state {
        VideoState::Idle => "Idle",
        VideoState::Negotiating => "Checking formats",
        VideoState::Recording => "Recording Video...",
        VideoState::Finalizing => "Finalizing",
    }
}

/// Execute the video command, holding `gate` while recording.
pub async fn execute_video(
    config: &CliConfig,
    args: &VideoArgs,
    reporter: &mut ProgressReporter,
    gate: ExportGate,
) -> CliResult<VideoExport> {
    let day = parse_day(args.selection.date.as_deref())?;
    let card = effective_config(&config.card, args);
    card.validate()?;

    let form = args.selection.form();
    let selection = form.validate()?;

    let compositor = build_compositor(&card).await;
    let renderer = PreviewRenderer::new(
        Arc::clone(compositor.catalog()),
        IllustrationPicker::default(),
    );
    let mut view = PreviewView::fully_bound();
    renderer.render(&selection, day, &mut view);
    let source = CardFrameSource::from_view(compositor, &view)?;

    let settings = VideoSettings::from_section(&card.video);
    let exporter = VideoExporter::new(
        Arc::new(FfmpegRuntime::new(&card.video.ffmpeg)),
        Arc::new(DirectoryDownloads::new(&card.output_dir)),
        Arc::new(ConsoleNotifier::new(reporter.use_color)),
    )
    .with_gate(gate)
    .with_settings(settings);

    if config.verbosity.is_verbose() {
        let (width, height) = settings.geometry.surface_size();
        reporter.info(&format!(
            "Recording {width}x{height} at {} fps for {}s",
            settings.fps,
            settings.duration.as_secs()
        ));
    }

    reporter.start_progress(settings.total_frames(), state_message(VideoState::Idle));
    let watcher = reporter.bar().map(|bar| {
        let mut progress = exporter.subscribe();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let snapshot = *progress.borrow_and_update();
                bar.set_position(snapshot.frames);
                bar.set_message(state_message(snapshot.state));
            }
        })
    });

    let result = exporter.export_video(&form, &source, day).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }

    let export = match result {
        Ok(export) => {
            reporter.set_position(export.frames);
            reporter.finish();
            export
        }
        Err(e) => {
            reporter.abandon();
            return Err(e.into());
        }
    };

    reporter.success(&format!(
        "Saved {} ({}, {} frames, {})",
        export.location.display(),
        export.format.container.label(),
        export.frames,
        format_size(export.size)
    ));
    Ok(export)
}
