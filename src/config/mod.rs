//! Configuration management for FastShrink

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShrinkError};
use crate::processing::{FilterType, ImageWorker, ResizePolicy, DEFAULT_JPEG_QUALITY};

/// Folder scanned for images when nothing else is configured
pub const DEFAULT_INPUT_DIR: &str = "images";

/// Folder receiving resized copies when nothing else is configured
pub const DEFAULT_OUTPUT_DIR: &str = "resized";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// When and how far to shrink
    pub policy: ResizePolicy,

    /// Encoder settings
    pub output: OutputConfig,

    /// Worker pool settings
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Input and output directories. Relative paths are resolved against the
/// directory holding the executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Resampling filter
    pub filter: FilterType,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filter: FilterType::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of worker threads (None = one per logical CPU)
    pub threads: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ShrinkError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        match config_extension(path.as_ref()).as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ShrinkError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = match config_extension(path.as_ref()).as_str() {
            "toml" => toml::to_string_pretty(self).map_err(|e| {
                ShrinkError::config(format!("TOML serialization failed: {}", e))
            })?,
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            _ => {
                return Err(ShrinkError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            ShrinkError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;

        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err(ShrinkError::config(format!(
                "JPEG quality must be between 1-100, got {}",
                self.output.jpeg_quality
            )));
        }

        if self.processing.threads == Some(0) {
            return Err(ShrinkError::config("Thread count must be greater than 0"));
        }

        Ok(())
    }

    /// Make relative input/output paths absolute against `base`
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.paths.input_dir.is_relative() {
            self.paths.input_dir = base.join(&self.paths.input_dir);
        }
        if self.paths.output_dir.is_relative() {
            self.paths.output_dir = base.join(&self.paths.output_dir);
        }
        self
    }

    /// Build a worker from the policy and output settings
    pub fn worker(&self) -> ImageWorker {
        ImageWorker::new(&self.paths.output_dir)
            .policy(self.policy)
            .filter(self.output.filter)
            .jpeg_quality(self.output.jpeg_quality)
    }
}

fn config_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Directory the running executable lives in
pub fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}
