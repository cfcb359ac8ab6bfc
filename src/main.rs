//! apidrift: API compatibility analysis between two versions of an
//! artifact.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apidrift::cli::{run_diff, DiffInvocation};
use apidrift::reports::ReportFormat;

#[derive(Parser)]
#[command(name = "apidrift")]
#[command(version)]
#[command(about = "Compare two versions of an API and report the differences", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Analysis completed (differences are findings, not failures)
    1  Fatal error

CONFIGURATION:
    Components read APIDRIFT_* environment variables, e.g.
    APIDRIFT_TRANSFORM_IGNORE_CODES='class.added' drops class additions.

EXAMPLES:
    # Compare two API manifests
    apidrift old.api.json new.api.json

    # Machine-readable output with dependency archives
    apidrift old.api.json new.api.json -o json --old-dep deps-v1.api.json --new-dep deps-v2.api.json")]
struct Cli {
    /// The old version's API archive
    old_archive: PathBuf,

    /// The new version's API archive
    new_archive: PathBuf,

    /// Dependency archive for the old side (repeatable)
    #[arg(long = "old-dep", value_name = "PATH")]
    old_supplementary: Vec<PathBuf>,

    /// Dependency archive for the new side (repeatable)
    #[arg(long = "new-dep", value_name = "PATH")]
    new_supplementary: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "summary")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Locale for difference descriptions
    #[arg(long, default_value = "en-US")]
    locale: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    run_diff(DiffInvocation {
        old: cli.old_archive,
        new: cli.new_archive,
        old_supplementary: cli.old_supplementary,
        new_supplementary: cli.new_supplementary,
        format: cli.output,
        output_file: cli.output_file,
        locale: cli.locale,
    })?;

    Ok(())
}
