//! Binary entry point for the propscan CLI.
//!
//! ## Usage
//!
//! ```bash
//! # List props of every components/*/index.ts* under the current directory
//! propscan
//!
//! # Scan another project on four threads and emit the JSON report
//! propscan ../ui --jobs 4 --json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use propscan::scan::{self, Outcome, ScanConfig};

/// List the props accepted by each component entry module.
#[derive(Parser, Debug)]
#[command(name = "propscan", version, about = "List the props of component entry modules")]
struct Cli {
    /// Project root (default: current directory).
    root: Option<PathBuf>,

    /// Glob selecting entry modules, relative to the root.
    #[arg(long)]
    pattern: Option<String>,

    /// Worker threads (1 scans sequentially).
    #[arg(long)]
    jobs: Option<usize>,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Log verbosity, overridden by RUST_LOG.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("propscan: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));
    let mut config = ScanConfig::load(&root)?;
    if let Some(pattern) = cli.pattern {
        config.pattern = pattern;
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }

    let report = scan::run(&config)?;

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    for file in &report.files {
        match &file.outcome {
            Outcome::Resolved { props } => {
                writeln!(out, "{}", file.path)?;
                writeln!(out, "  {}", props.join(", "))?;
            }
            Outcome::Failed { kind, message } => {
                writeln!(out, "{}", file.path)?;
                writeln!(out, "  [{}] {}", kind, message)?;
            }
        }
    }
    writeln!(
        out,
        "{} resolved, {} failed",
        report.resolved_count(),
        report.failed_count()
    )?;
    Ok(())
}
