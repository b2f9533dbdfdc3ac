//! FastShrink CLI - Parallel Batch Image Shrinker
//!
//! With no arguments, shrinks everything in the `images` folder next to the
//! executable into a `resized` folder next to it.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tracing::info;

use fastshrink::config::program_dir;
use fastshrink::{init_with_config, BatchDispatcher, Config, ShrinkError};

/// FastShrink - Parallel Batch Image Shrinker
#[derive(Parser)]
#[command(
    name = "fastshrink",
    version,
    about = "Shrink oversized images in a folder tree using every CPU core",
    long_about = "FastShrink walks an input folder, proportionally shrinks every PNG, JPEG, \
                  BMP and GIF larger than 512x768 to a 768 pixel bound, and writes the copies \
                  to an output folder as name_1.ext, name_2.ext and so on, never overwriting \
                  an existing file."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input directory [default: images, next to the executable]
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output directory [default: resized, next to the executable]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Number of worker threads (default: one per CPU core)
    #[arg(short, long, value_name = "COUNT")]
    threads: Option<usize>,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE", env = "FASTSHRINK_CONFIG")]
    config: Option<PathBuf>,

    /// Print the run summary as JSON instead of text lines
    #[arg(long)]
    json: bool,

    /// Show a progress bar on stderr
    #[arg(long, conflicts_with = "json")]
    progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "fastshrink.toml")]
        output: PathBuf,
        /// Use YAML format instead of TOML
        #[arg(long)]
        yaml: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        if let Err(e) = handle_subcommand(command) {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    init_with_config(&config.logging);

    let dispatcher = match BatchDispatcher::new(config.worker(), config.processing.threads) {
        Ok(dispatcher) => dispatcher.echo(!cli.json).progress(cli.progress),
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    info!("Input: {:?}", config.paths.input_dir);
    info!("Output: {:?}", config.paths.output_dir);

    match dispatcher.run(&config.paths.input_dir) {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("{}: {}", style("Error").red().bold(), e);
                        process::exit(1);
                    }
                }
            } else {
                summary.print_summary();
            }
        }
        Err(e @ ShrinkError::InputNotFound { .. }) => {
            println!("{e}");
        }
        Err(e) => {
            match e.file_path() {
                Some(path) => eprintln!(
                    "{}: Processing failed at {}: {}",
                    style("Error").red().bold(),
                    path.display(),
                    e
                ),
                None => eprintln!("{}: Processing failed: {}", style("Error").red().bold(), e),
            }
            process::exit(1);
        }
    }
}

/// Merge defaults, the optional config file and command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(input) = &cli.input {
        config.paths.input_dir.clone_from(input);
    }
    if let Some(output) = &cli.output {
        config.paths.output_dir.clone_from(output);
    }
    if cli.threads.is_some() {
        config.processing.threads = cli.threads;
    }
    if cli.quiet {
        config.logging.level = "error".to_string();
    } else if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;

    // Flags are relative to the working directory, config values to the program
    if cli.input.is_some() || cli.output.is_some() {
        let cwd = std::env::current_dir()?;
        if let Some(input) = &cli.input {
            config.paths.input_dir = cwd.join(input);
        }
        if let Some(output) = &cli.output {
            config.paths.output_dir = cwd.join(output);
        }
    }

    Ok(config.resolve_paths(&program_dir()?))
}

fn handle_subcommand(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::ExampleConfig { output, yaml } => {
            let output = if yaml && output == PathBuf::from("fastshrink.toml") {
                PathBuf::from("fastshrink.yaml")
            } else {
                output
            };

            Config::default().to_file(&output)?;

            let format = if yaml { "YAML" } else { "TOML" };
            println!(
                "{}: Generated example {} configuration: {}",
                style("Success").green().bold(),
                format,
                output.display()
            );
        }
    }
    Ok(())
}
