//! Containment CLI - behavioral-shift analysis of LLM evaluation runs
//!
//! ## Commands
//!
//! - `containment compression --input <json>` - Baseline vs. trigger token compression
//! - `containment sequence --input <json>` - Multi-turn lock-in, persistence, bias and escape
//! - `containment detect --text <file>` - Pairwise containment detection on one response
//! - `containment metrics --text <file>` - Lexical metric vector of one response

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod format;

use commands::{compression, detect, metrics, sequence};

/// Containment - behavioral-shift metrics for LLM responses
#[derive(Parser)]
#[command(name = "containment")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// TOML file with detector thresholds, lexicons, tiers and prompt heuristics
    #[arg(short, long, global = true, env = "CONTAINMENT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare baseline and trigger responses per group
    #[command(alias = "comp")]
    Compression {
        /// JSON array of result records
        #[arg(short, long)]
        input: PathBuf,

        /// Write the per-group CSV export here
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write a Markdown report here
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a scripted multi-turn conversation run
    #[command(alias = "seq")]
    Sequence {
        /// JSON array of result records
        #[arg(short, long)]
        input: PathBuf,

        /// Write the per-sample CSV export here
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write a Markdown report here
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the pairwise detector on one response
    Detect {
        /// File holding the response text
        #[arg(short, long)]
        text: PathBuf,

        /// File holding the baseline response
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Files holding earlier turns, oldest first
        #[arg(long, num_args = 1..)]
        history: Vec<PathBuf>,

        /// Consensus-collapse entropy drop threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the lexical metric vector of one response
    Metrics {
        /// File holding the response text
        #[arg(short, long)]
        text: PathBuf,

        /// Print the metrics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Compression { input, csv, markdown, json } => compression::run(
                &config,
                &input,
                csv.as_deref(),
                markdown.as_deref(),
                json,
            ),
            Commands::Sequence { input, csv, markdown, json } => sequence::run(
                &config,
                &input,
                csv.as_deref(),
                markdown.as_deref(),
                json,
            ),
            Commands::Detect { text, baseline, history, threshold, json } => {
                detect::run(&config, &text, baseline.as_deref(), &history, threshold, json)
            }
            Commands::Metrics { text, json } => metrics::run(&config, &text, json),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
