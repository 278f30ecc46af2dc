//! symrecover CLI - recover symbols from custom sections of stripped binaries

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use symrecover::logging;
use symrecover::recovery::report::{FailureDocument, ReportDocument};
use symrecover::{scan_file, RecoveryConfig};
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "symrecover",
    version,
    about = "Recover symbol information from stripped ELF64 binaries",
    long_about = "Recovers symbol information from stripped binaries by analyzing \
                  custom sections that survive the stripping process."
)]
struct Cli {
    /// ELF file to scan
    file: PathBuf,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,

    /// JSON file overriding the default recovery limits
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RecoveryConfig> {
    let Some(path) = path else {
        return Ok(RecoveryConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let shown = cli.file.display().to_string();

    let report = match scan_file(&cli.file, &config) {
        Ok(report) => report,
        Err(err) => {
            error!(path = %shown, error = %err, "Scan failed");
            if cli.json {
                let doc = FailureDocument::new(&shown, &err);
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("=== SYMBOL RECOVERY FROM {shown} ===");
                println!("Scan aborted: {err}");
            }
            eprintln!("symrecover: {shown}: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.json {
        let doc = ReportDocument::new(&shown, &report);
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("=== SYMBOL RECOVERY FROM {shown} ===");
        println!();
        print!("{report}");
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if cli.log_json {
        logging::init_tracing_json(level);
    } else {
        logging::init_tracing(level);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("symrecover: {err:#}");
            ExitCode::FAILURE
        }
    }
}
