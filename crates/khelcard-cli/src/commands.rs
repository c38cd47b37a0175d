//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use khelcard::media::CompressionLevel;
use khelcard::ResultForm;
use std::path::PathBuf;

/// Khelcard: preview and export khel result cards as PNG or video
#[derive(Parser, Debug)]
#[command(name = "khelcard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Configuration file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the games in the catalog
    Catalog(CatalogArgs),

    /// Show what the live preview displays for a selection
    Preview(PreviewArgs),

    /// Export the result card as a PNG image
    Png(PngArgs),

    /// Record the preview as a short video clip
    Video(VideoArgs),
}

/// Form fields shared by every card command
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Result number (1-100)
    #[arg(short, long, default_value = "")]
    pub number: String,

    /// Game code (S, M, E, F, H, N, T, G, L, K)
    #[arg(short, long, default_value = "")]
    pub game: String,

    /// Custom game label shown instead of the catalog names
    #[arg(short, long, default_value = "")]
    pub label: String,

    /// Card date as YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
}

impl SelectionArgs {
    /// The raw form these arguments describe
    #[must_use]
    pub fn form(&self) -> ResultForm {
        ResultForm::new(
            self.number.as_str(),
            self.game.as_str(),
            self.label.as_str(),
        )
    }
}

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Form fields
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the png command
#[derive(Args, Debug)]
pub struct PngArgs {
    /// Form fields
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Asset directory (logo, illustrations, font)
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// PNG compression
    #[arg(long)]
    pub compression: Option<CompressionArg>,
}

/// Arguments for the video command
#[derive(Args, Debug)]
pub struct VideoArgs {
    /// Form fields
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Asset directory (logo, illustrations, font)
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// Recording length in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Viewport width; 768 or less records a smaller frame
    #[arg(long)]
    pub viewport_width: Option<u32>,

    /// ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// PNG compression argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionArg {
    /// Fast compression
    Fast,
    /// Default compression
    Default,
    /// Best compression
    Best,
}

impl From<CompressionArg> for CompressionLevel {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Fast => Self::Fast,
            CompressionArg::Default => Self::Default,
            CompressionArg::Best => Self::Best,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
