//! Error types for scene compositing operations

use std::path::Path;
use thiserror::Error;

/// Result type alias using `SceneMergeError`
pub type Result<T> = std::result::Result<T, SceneMergeError>;

/// Errors that can occur during scene compositing
#[derive(Debug, Error)]
pub enum SceneMergeError {
    /// Input bytes could not be decoded into an image
    #[error("Failed to decode input image: {message}")]
    Decode {
        /// Description of the decode failure
        message: String,
    },

    /// The subject-extraction provider failed
    #[error("Matting provider failure: {message}")]
    Matting {
        /// Description of the provider failure
        message: String,
    },

    /// Internal invariant violation: subject and background dimensions diverged
    ///
    /// This must never occur when the background has been normalized to the
    /// subject's dimensions first; it is a bug in the caller, not a user error.
    #[error("Compositing invariant violated: {message}")]
    Compositing {
        /// Description of the invariant violation
        message: String,
    },

    /// The background generation provider returned an unusable response
    ///
    /// Never surfaces to callers: background synthesis degrades to the
    /// procedural fallback, and this variant only feeds the degradation log.
    #[error("Background synthesis failure: {message}")]
    Synthesis {
        /// Description of the provider failure
        message: String,
    },

    /// Network-level failure talking to an external provider
    #[error("Network error during {operation}: {source}")]
    Network {
        /// The operation that was being performed
        operation: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Invalid configuration supplied to a builder or constructor
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration problem
        message: String,
    },

    /// Image encoding or file output failure
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// File I/O failure with path context
    #[error("File I/O error ({operation} {path:?}): {source}")]
    FileIo {
        /// The operation that was being performed
        operation: String,
        /// Path involved in the failure
        path: std::path::PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SceneMergeError {
    /// Create a decode error with a descriptive message
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a matting provider error with a descriptive message
    pub fn matting<S: Into<String>>(message: S) -> Self {
        Self::Matting {
            message: message.into(),
        }
    }

    /// Create a compositing invariant error with a descriptive message
    pub fn compositing<S: Into<String>>(message: S) -> Self {
        Self::Compositing {
            message: message.into(),
        }
    }

    /// Create a background synthesis error with a descriptive message
    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Create a network error with operation context
    pub fn network<S: Into<String>>(operation: S, source: reqwest::Error) -> Self {
        Self::Network {
            operation: operation.into(),
            source,
        }
    }

    /// Create an invalid configuration error with a descriptive message
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a file I/O error with operation and path context
    pub fn file_io_error<S: Into<String>, P: AsRef<Path>>(
        operation: S,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileIo {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
