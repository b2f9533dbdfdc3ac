//! FastShrink - Parallel Batch Image Shrinker
//!
//! Walks a directory tree, shrinks every oversized image proportionally and
//! writes the result into a single output folder without ever overwriting an
//! existing file. Work is spread over a fixed-size thread pool with one
//! thread per CPU core.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fastshrink::{BatchDispatcher, ImageWorker};
//! use std::path::Path;
//!
//! let worker = ImageWorker::new("resized");
//! let dispatcher = BatchDispatcher::new(worker, None)?;
//! let summary = dispatcher.run(Path::new("photos"))?;
//!
//! summary.print_summary();
//! # Ok::<(), fastshrink::ShrinkError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod parallel;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, LoggingConfig};
pub use error::{Result, ShrinkError};
pub use parallel::{BatchDispatcher, BatchSummary, CounterSnapshot, Counters};
pub use processing::{
    Dimensions, FilterType, ImageOutcome, ImageWorker, ResizeDecision, ResizePolicy, UniqueNamer,
};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with an explicit configuration.
///
/// Logs go to stderr so that stdout only carries the per-image report.
/// Calling this more than once is harmless.
pub fn init_with_config(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = if config.json_format {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed {
        info!("FastShrink v{} initialized with level '{}'", VERSION, config.level);
    }
}
