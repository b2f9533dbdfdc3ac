//! Fan-out of image work across a fixed-size thread pool

use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, ShrinkError};
use crate::processing::{collect_image_paths, ImageOutcome, ImageWorker};

pub mod counters;

pub use counters::*;

/// Runs an [`ImageWorker`] over every image in a directory tree.
pub struct BatchDispatcher {
    worker: ImageWorker,
    pool: rayon::ThreadPool,
    threads: usize,
    echo: bool,
    progress: bool,
}

impl BatchDispatcher {
    /// Create a dispatcher with `threads` workers, or one per logical CPU
    pub fn new(worker: ImageWorker, threads: Option<usize>) -> Result<Self> {
        let threads = threads.unwrap_or_else(num_cpus::get).max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fastshrink-worker-{i}"))
            .build()?;

        info!("Initializing worker pool with {} threads", threads);

        Ok(Self {
            worker,
            pool,
            threads,
            echo: true,
            progress: false,
        })
    }

    /// Print one line per image to stdout (default: on)
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Draw a progress bar on stderr (default: off)
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Shrink every supported image below `input_root`.
    ///
    /// Fails only when the run cannot start at all: a missing input root or
    /// an output directory that cannot be created. Per-image failures end up
    /// in the summary.
    pub fn run(&self, input_root: &Path) -> Result<BatchSummary> {
        if !input_root.exists() {
            return Err(ShrinkError::InputNotFound {
                path: input_root.to_path_buf(),
            });
        }

        let output_dir = self.worker.output_dir();
        std::fs::create_dir_all(output_dir).map_err(|source| ShrinkError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let paths = collect_image_paths(input_root);
        info!(
            "Found {} images under {:?}, writing to {:?}",
            paths.len(),
            input_root,
            output_dir
        );

        let progress_bar = self.progress_bar(paths.len() as u64);
        let counters = Counters::new();

        let start_time = Instant::now();
        let outcomes: Vec<ImageOutcome> = self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let outcome = self.worker.process(path);
                    counters.record(&outcome);
                    self.report(&progress_bar, &outcome);
                    progress_bar.inc(1);
                    outcome
                })
                .collect()
        });
        let processing_time = start_time.elapsed();

        progress_bar.finish_and_clear();

        let counts = counters.snapshot();
        if counts.failed > 0 {
            warn!("{} images could not be processed", counts.failed);
        }
        info!(
            "Batch completed in {:.2}s ({} resized, {} unchanged)",
            processing_time.as_secs_f64(),
            counts.resized,
            counts.unchanged
        );

        Ok(BatchSummary {
            counts,
            elapsed_secs: processing_time.as_secs_f64(),
            threads: self.threads,
            failures: outcomes.into_iter().filter(ImageOutcome::is_failure).collect(),
        })
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}, {eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    fn report(&self, progress_bar: &ProgressBar, outcome: &ImageOutcome) {
        debug!("{}", outcome);

        if !self.echo {
            return;
        }
        if progress_bar.is_hidden() {
            println!("{outcome}");
        } else {
            progress_bar.println(outcome.to_string());
        }
    }
}

/// Final numbers for one run, read after every worker has finished
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    #[serde(flatten)]
    pub counts: CounterSnapshot,
    pub elapsed_secs: f64,
    pub threads: usize,
    pub failures: Vec<ImageOutcome>,
}

impl BatchSummary {
    /// Wall-clock line printed right after the pool drains
    pub fn timing_line(&self) -> String {
        format!("Processing time: {:.2} seconds", self.elapsed_secs)
    }

    pub fn summary_lines(&self) -> [String; 3] {
        [
            format!("Processed a total of {} images", self.counts.total),
            format!("Compressed a total of {} images", self.counts.resized),
            format!("{} images did not require compression", self.counts.unchanged),
        ]
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("{}", self.timing_line());
        for line in self.summary_lines() {
            println!("{line}");
        }
    }
}
