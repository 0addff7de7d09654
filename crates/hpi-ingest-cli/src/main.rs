use std::path::PathBuf;

use clap::Parser;
use hpi_ingest::{IngestOutcome, Ingester, Progress};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "hpi-ingest")]
#[command(
    about = "Append new monthly housing price index reports to the dataset",
    long_about = None
)]
struct Cli {
    #[arg(
        value_name = "DATASET",
        default_value = "all_stats.json",
        help = "JSON dataset to extend"
    )]
    dataset: PathBuf,

    #[arg(
        value_name = "INPUT_DIR",
        default_value = "html_files",
        help = "Folder holding one <month>.html report per month"
    )]
    input_dir: PathBuf,

    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Diagnostics written to stderr: off, error, warn, info, debug or trace"
    )]
    log_level: LevelFilter,
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Pending(months) => println!(
            "Found {} new file(s) to process: {}",
            months.len(),
            months.join(", ")
        ),
        Progress::Processing(path) => println!("Processing {}...", path.display()),
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new().filter_level(cli.log_level).init();

    let ingester = Ingester::new(cli.dataset, cli.input_dir);

    match ingester.run_with(print_progress) {
        Ok(IngestOutcome::UpToDate) => println!("Dataset is already up to date, nothing to do."),
        Ok(IngestOutcome::Updated(report)) => print!("\n{}", report),
        Err(e) => {
            log::debug!("Ingestion aborted: {e:?}");
            println!("Error: {}", e);
        }
    }
}
