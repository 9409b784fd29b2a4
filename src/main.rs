//! `ens-annotation-validate`: validate one annotation file and write a report.

use annoval::models::FileType;
use annoval::report::{prepare_out_dir, write_report};
use annoval::runner::{validate_file, ValidationConfig, DEFAULT_MAX_REPORTED_FAILURES};
use annoval::schema::Mode;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "ens-annotation-validate", version)]
#[command(about = "Validate Ensembl genome annotation files against their schema")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// File to validate
    file: PathBuf,

    /// File type to validate as
    #[arg(long = "type", short = 't', value_enum, default_value_t = FileType::default())]
    file_type: FileType,

    /// Directory the report is written to
    #[arg(long, short = 'o', default_value = ".")]
    out_dir: PathBuf,

    /// Disable type coercion (text "42" is not an integer)
    #[arg(long)]
    strict: bool,

    /// Maximum number of rejected records detailed in the report
    #[arg(long, default_value_t = DEFAULT_MAX_REPORTED_FAILURES)]
    max_errors: usize,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ValidationConfig {
        mode: Mode::from_strict(cli.strict),
        max_reported_failures: cli.max_errors,
    };

    prepare_out_dir(&cli.out_dir).context("preparing output directory")?;
    let report = validate_file(&cli.file, cli.file_type, &config)
        .with_context(|| format!("validating {}", cli.file.display()))?;
    let path = write_report(&report, &cli.out_dir, config.max_reported_failures)?;

    println!(
        "{}: {} records, {} accepted, {} rejected. Report: {}",
        cli.file.display(),
        report.total,
        report.accepted,
        report.rejected,
        path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
