//! Print the per-service JaCoCo instruction coverage summary.
//!
//! ```bash
//! # Summarise the workspace this tool was built in
//! coverage_summary
//!
//! # Summarise another checkout, as JSON
//! coverage_summary --root /path/to/repo --format json
//! ```
//!
//! Diagnostics go to stderr and are filtered by `RUST_LOG` (default `warn`).

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use coverage_summary::{resolve_root, summarize, Options, OutputFormat, SummaryError};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "coverage_summary")]
#[command(about = "Per-service JaCoCo instruction coverage summary")]
struct Cli {
    /// Repository root containing `services/` (defaults to this tool's workspace)
    #[arg(long, env = "COVERAGE_SUMMARY_ROOT")]
    root: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Report unreadable reports and keep summarising the rest
    #[arg(long)]
    keep_going: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let format = cli.format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?;
    let root = resolve_root(cli.root)?;
    tracing::debug!("summarising coverage under {}", root.display());

    let options = Options {
        format,
        keep_going: cli.keep_going,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = summarize(&root, &mut out, options)
        .with_context(|| format!("coverage summary failed under {}", root.display()))?;
    out.flush().context("failed to flush summary")?;

    if !outcome.failures.is_empty() {
        return Err(SummaryError::Incomplete {
            failed: outcome.failures.len(),
        }
        .into());
    }

    Ok(())
}
