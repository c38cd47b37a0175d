//! Result and error types for Khelcard.

use thiserror::Error;

/// Result type for Khelcard operations
pub type CardResult<T> = Result<T, CardError>;

/// Broad failure class, used by front ends to decide how to surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing form input; reported through the form itself
    Validation,
    /// The runtime lacks a required export capability
    Capability,
    /// Compositing, encoding or delivery failed
    Runtime,
}

/// Errors that can occur in Khelcard
#[derive(Debug, Error)]
pub enum CardError {
    /// A form field failed its constraint
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Form field name
        field: &'static str,
        /// Constraint message
        message: String,
    },

    /// Export capability missing (no recorder, no supported codec)
    #[error("Capability unavailable: {message}")]
    Capability {
        /// Error message
        message: String,
    },

    /// Image encoding error
    #[error("Encoding failed: {message}")]
    Encoding {
        /// Error message
        message: String,
    },

    /// Video recording error
    #[error("Video recording failed: {message}")]
    VideoRecording {
        /// Error message
        message: String,
    },

    /// Another export is already running
    #[error("An export is already in progress")]
    Busy,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CardError {
    /// Create a validation error for a form field
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a capability error
    #[must_use]
    pub fn capability(message: impl Into<String>) -> Self {
        Self::Capability {
            message: message.into(),
        }
    }

    /// Create an encoding error
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a video recording error
    #[must_use]
    pub fn video(message: impl Into<String>) -> Self {
        Self::VideoRecording {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Failure class of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Capability { .. } => ErrorKind::Capability,
            Self::Encoding { .. }
            | Self::VideoRecording { .. }
            | Self::Busy
            | Self::Config { .. }
            | Self::Io(_)
            | Self::Yaml(_) => ErrorKind::Runtime,
        }
    }
}
