//! PNG export command handler.

use crate::commands::PngArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::{build_compositor, parse_day};
use crate::output::{format_size, ConsoleNotifier, ProgressReporter};
use khelcard::media::{DirectoryDownloads, ImageExporter, PngEncoder, PngExport};
use khelcard::{CardConfig, ExportGate};
use std::sync::Arc;

/// Apply command-line overrides on top of the loaded configuration
#[must_use]
pub fn effective_config(base: &CardConfig, args: &PngArgs) -> CardConfig {
    let mut card = base.clone();
    if let Some(ref output) = args.output {
        card.output_dir.clone_from(output);
    }
    if let Some(ref assets) = args.assets {
        card.asset_dir.clone_from(assets);
    }
    if let Some(compression) = args.compression {
        card.png.compression = compression.into();
    }
    card
}

/// Execute the png command, holding `gate` while exporting.
pub async fn execute_png(
    config: &CliConfig,
    args: &PngArgs,
    reporter: &ProgressReporter,
    gate: ExportGate,
) -> CliResult<PngExport> {
    let day = parse_day(args.selection.date.as_deref())?;
    let card = effective_config(&config.card, args);
    card.validate()?;

    if config.verbosity.is_verbose() {
        reporter.info(&format!("Assets: {}", card.asset_dir.display()));
    }

    let compositor = build_compositor(&card).await;
    let exporter = ImageExporter::new(
        compositor,
        Arc::new(DirectoryDownloads::new(&card.output_dir)),
        Arc::new(ConsoleNotifier::new(reporter.use_color)),
    )
    .with_gate(gate)
    .with_encoder(PngEncoder::new().with_compression(card.png.compression));

    let export = exporter.export_png(&args.selection.form(), day).await?;
    reporter.success(&format!(
        "Saved {} ({})",
        export.location.display(),
        format_size(export.size)
    ));
    Ok(export)
}
