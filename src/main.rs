extern crate ccre;

use ccre::output::FileOutput;
use ccre::{run_report, ReportFlags};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct ReportArgs {
    /// JSON reporting document describing the estate and its metered usage
    input_file: String,
    /// Directory the CSV exports are written into
    #[arg(long, short, default_value = ".")]
    output_directory: PathBuf,
    /// Replace the document's usage with synthesised demonstration data
    #[arg(long, default_value_t = false)]
    demo_data: bool,
    /// Also write a per-building breakdown file
    #[arg(long, default_value_t = false)]
    detailed_output: bool,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let args = ReportArgs::parse();

    let input_path = Path::new(&args.input_file);
    let input_file_stem = input_path
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("Could not determine input file name"))?
        .to_string_lossy();

    let file_output = FileOutput::new(
        args.output_directory,
        format!("{input_file_stem}_{{}}.csv"),
    );

    let mut flags = ReportFlags::empty();
    if args.demo_data {
        flags.insert(ReportFlags::DEMO_DATA);
    }
    if args.detailed_output {
        flags.insert(ReportFlags::DETAILED_OUTPUT);
    }

    let results = run_report(
        BufReader::new(File::open(input_path)?),
        file_output,
        &flags,
    )?;

    match results.totals {
        Some(totals) => info!(
            "report complete: {} entr(ies), {} tonnes CO2e in total",
            totals.entry_count, totals.total_tonnes
        ),
        None => info!("report complete: no usage data reported"),
    }
    if let Some(progress) = results.progress {
        info!(
            "reduction progress for {}: {}",
            progress.latest_year, progress.status
        );
    }

    Ok(())
}
