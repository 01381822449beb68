//! Malaga CLI binary.
//!
//! Provides a command-line interface to the Malaga factor analytics engine.
//! Inputs are long-format CSV files; `RUST_LOG` controls log output, which goes
//! to stderr and, with `--log-dir`, also to `malaga.log` in that directory.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "malaga")]
#[command(about = "Factor performance analytics", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to also write logs to, as malaga.log
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Long-format input files shared by every command.
#[derive(Debug, Args)]
pub(crate) struct InputArgs {
    /// Factor observations: CSV with date, asset, label and value columns
    #[arg(long)]
    pub(crate) factors: PathBuf,

    /// Target (forward return) observations, same layout as the factors
    #[arg(long)]
    pub(crate) targets: PathBuf,

    /// Name of the date column
    #[arg(long)]
    pub(crate) date_column: Option<String>,

    /// Name of the asset column
    #[arg(long)]
    pub(crate) asset_column: Option<String>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Text,
    /// JSON document
    Json,
}

/// Arguments of the `report` command.
#[derive(Debug, Args)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,

    /// Benchmark returns: CSV with date, label and value columns
    #[arg(long)]
    pub(crate) benchmarks: Option<PathBuf>,

    /// Factor label to evaluate
    #[arg(long)]
    pub(crate) factor: String,

    /// Target label used for groups and long/short returns
    #[arg(long)]
    pub(crate) target: String,

    /// TOML configuration file
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Trading calendar: CSV whose first column lists trading dates
    #[arg(long)]
    pub(crate) calendar: Option<PathBuf>,

    /// Number of quantile groups
    #[arg(short, long)]
    pub(crate) groups: Option<usize>,

    /// Long/short cutoffs, in assets
    #[arg(long, value_delimiter = ',')]
    pub(crate) cutoffs: Option<Vec<usize>>,

    /// Number of worst drawdowns reported per series
    #[arg(long)]
    pub(crate) worst_drawdowns: Option<usize>,

    /// Directory to write every table to as CSV
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub(crate) format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Pivot and join inputs, then summarize their coverage
    Prepare(InputArgs),

    /// Per-date IC and rank IC of a factor against every target
    Ic {
        #[command(flatten)]
        inputs: InputArgs,

        /// Factor label to evaluate
        #[arg(long)]
        factor: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Quantile, long/short and benchmark returns with statistics and drawdowns
    Report(ReportArgs),
}

fn main() {
    let cli = Cli::parse();
    let guard = init_logging(cli.log_dir.as_deref());
    let result = run(cli);
    // flush the file writer before exiting
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Opens `malaga.log` in `dir`, appending across runs.
fn log_file(dir: &Path) -> Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("malaga")
        .filename_suffix("log")
        .build(dir)?)
}

/// Installs the stderr subscriber, plus a file layer when `log_dir` is set.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir.map(log_file) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        Some(Err(e)) => {
            eprintln!("Warning: failed to open log file: {e:#}");
            (None, None)
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Warning: failed to install log subscriber: {e}");
    }
    guard
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Prepare(inputs) => cmd::prepare::run(&inputs)?,
        Commands::Ic {
            inputs,
            factor,
            format,
        } => cmd::ic::run(&inputs, &factor, format)?,
        Commands::Report(args) => cmd::report::run(&args)?,
    }

    Ok(())
}
