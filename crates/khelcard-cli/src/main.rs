//! Khelcard CLI: preview and export khel result cards
//!
//! ## Usage
//!
//! ```bash
//! khelcard catalog                          # List games
//! khelcard preview -n 7 -g S                # Show the preview text
//! khelcard png -n 7 -g S -o out/            # Export a PNG card
//! khelcard video -n 7 -g S --duration 5     # Record a video clip
//! ```

use clap::Parser;
use khelcard::{CardConfig, ExportGate};
use khelcard_cli::{
    handlers, logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands,
    ProgressReporter, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli)?;
    logging::init(&config);
    tracing::debug!(verbosity = ?config.verbosity, "configuration loaded");

    let mut reporter = ProgressReporter::new(
        config.color.should_color(),
        config.verbosity.is_quiet(),
    );

    match cli.command {
        Commands::Catalog(args) => handlers::execute_catalog(&args),
        Commands::Preview(args) => handlers::execute_preview(&args),
        Commands::Png(args) => {
            let gate = ExportGate::global();
            block_on(async { handlers::execute_png(&config, &args, &reporter, gate).await })??;
            Ok(())
        }
        Commands::Video(args) => {
            let gate = ExportGate::global();
            block_on(async {
                handlers::execute_video(&config, &args, &mut reporter, gate).await
            })??;
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future>(future: F) -> CliResult<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))?;
    Ok(rt.block_on(future))
}

fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let card = match cli.config {
        Some(ref path) => CardConfig::load(path)?,
        None => CardConfig::default(),
    };
    card.validate()?;

    Ok(CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color.clone()))
        .with_log_json(cli.log_json)
        .with_card(card))
}
