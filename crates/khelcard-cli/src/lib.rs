//! Khelcard CLI library
//!
//! Command-line front end for the khelcard result-card exporter: list the
//! catalog, inspect the live preview and export cards as PNG or video.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    CatalogArgs, Cli, ColorArg, Commands, CompressionArg, FormatArg, PngArgs, PreviewArgs,
    SelectionArgs, VideoArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{format_size, ConsoleNotifier, OutputFormat, ProgressReporter};
