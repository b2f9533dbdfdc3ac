//! Error types and handling for FastShrink

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for FastShrink operations
pub type Result<T> = std::result::Result<T, ShrinkError>;

/// Main error type for FastShrink operations
#[derive(Debug, Error)]
pub enum ShrinkError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A directory could not be read while collecting inputs
    #[error("Failed to traverse {path:?}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The input could not be opened or decoded
    #[error("{source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// No destination name could be claimed in the output directory
    #[error("Failed to claim output file in {dir:?}: {source}")]
    Naming {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or writing the resized image failed
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The output directory could not be created
    #[error("Failed to create output directory: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input root is missing
    #[error("The directory '{}' does not exist. Please check the path.", path.display())]
    InputNotFound { path: PathBuf },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid resize parameters
    #[error("Invalid resize parameters: {message}")]
    InvalidParameters { message: String },

    /// Worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ShrinkError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    pub fn decode(path: &Path, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn write(path: &Path, source: image::ImageError) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn naming(dir: &Path, source: std::io::Error) -> Self {
        Self::Naming {
            dir: dir.to_path_buf(),
            source,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::Traversal { path, .. }
            | Self::Decode { path, .. }
            | Self::Write { path, .. }
            | Self::OutputDir { path, .. }
            | Self::InputNotFound { path } => Some(path),
            Self::Naming { dir, .. } => Some(dir),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ShrinkError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ShrinkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
