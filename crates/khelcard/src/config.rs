//! Card and export settings, loadable from YAML.

use crate::compositor::{DEFAULT_TITLE, LOGO_ASSET};
use crate::media::CompressionLevel;
use crate::result::{CardError, CardResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Title across the top of the card
    pub title: String,
    /// Directory holding logo, illustrations and font
    pub asset_dir: PathBuf,
    /// Where exports are written
    pub output_dir: PathBuf,
    /// TrueType font asset for card text
    pub font: Option<String>,
    /// Corner logo asset
    pub logo: String,
    /// PNG export settings
    pub png: PngSection,
    /// Video export settings
    pub video: VideoSection,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            asset_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("."),
            font: None,
            logo: LOGO_ASSET.to_string(),
            png: PngSection::default(),
            video: VideoSection::default(),
        }
    }
}

impl CardConfig {
    /// Parse from YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or a value is out of range
    pub fn from_yaml(yaml: &str) -> CardResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> CardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> CardResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `CardError::Config` naming the first bad value
    pub fn validate(&self) -> CardResult<()> {
        let video = &self.video;
        if video.fps == 0 || video.fps > 60 {
            return Err(CardError::config(format!(
                "video.fps must be between 1 and 60, got {}",
                video.fps
            )));
        }
        if video.duration_secs == 0 {
            return Err(CardError::config("video.duration_secs must be positive"));
        }
        if video.region_width == 0 || video.region_height == 0 {
            return Err(CardError::config("video region must have a non-zero size"));
        }
        Ok(())
    }
}

/// PNG export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PngSection {
    /// zlib effort
    pub compression: CompressionLevel,
}

/// Video export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSection {
    /// Recording length
    pub duration_secs: u64,
    /// Frames per second
    pub fps: u32,
    /// Target bitrate
    pub bitrate_bps: u64,
    /// Preview region width
    pub region_width: u32,
    /// Preview region height
    pub region_height: u32,
    /// Viewport width; narrow viewports record a smaller region
    pub viewport_width: u32,
    /// ffmpeg executable
    pub ffmpeg: PathBuf,
}

impl Default for VideoSection {
    fn default() -> Self {
        Self {
            duration_secs: 10,
            fps: 30,
            bitrate_bps: 2_500_000,
            region_width: 700,
            region_height: 500,
            viewport_width: 1280,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl VideoSection {
    /// Recording length as a duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}
