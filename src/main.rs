//! reduction-pipeline - Main Entry Point
//!
//! Runs the streaming reduction pipeline once and prints the results.
//!
//! ```bash
//! reduction-pipeline                      # 4 processes, N = 10
//! reduction-pipeline -n 6 -l 12
//! reduction-pipeline --config pipeline.toml --log-level debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use reduction_pipeline::{
    config::{init_logging, PipelineConfig},
    pipeline::{ConsoleReporter, Pipeline},
};
use std::path::PathBuf;

/// Sum, negated sum and product over 1..=N through a message-passing pipeline
#[derive(Parser, Debug)]
#[command(name = "reduction-pipeline")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total number of processes, source included (at least 2)
    #[arg(short = 'n', long)]
    processes: Option<usize>,

    /// Length of the input sequence
    #[arg(short = 'l', long)]
    sequence_len: Option<usize>,

    /// Log filter (trace, debug, info, warn, error, or a directive)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(n) = self.processes {
            config.topology.process_count = n;
        }
        if let Some(len) = self.sequence_len {
            config.sequence.length = len;
        }
        if let Some(level) = &self.log_level {
            config.logging.filter = level.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::discover()?,
    };
    config.apply_env_overrides()?;
    cli.apply(&mut config);

    let _log_guard = init_logging(&config.logging)?;
    tracing::info!(
        processes = config.topology.process_count,
        sequence_len = config.sequence.length,
        "Starting reduction pipeline"
    );

    config.validate()?;

    let pipeline = Pipeline::from_config(&config)?;
    pipeline
        .run(ConsoleReporter)
        .with_context(|| format!("pipeline with {} processes failed", config.topology.process_count))?;

    Ok(())
}
