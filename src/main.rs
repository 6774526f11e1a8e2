use clap::Parser;
use labops_clients::CaseServices;
use labops_core::constants::DEFAULT_SAMPLE_LIST;
use labops_core::{load_config, resolve_config_path, RunOptions, RunProcessor, RunReport};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Process one sequencing run end to end.
///
/// Every well of `<Paths.run_path>/<run_id>` is resolved against Emedgene and Phenotips, a
/// singleton sample sheet is written per sample into `Paths.sample_sheet_path` together with
/// the run index `<run_id>_samples`, and the resolved samples are appended to the sample list.
///
/// # Environment Variables
/// - `LABOPS_CONFIG`: configuration file (default: `.myconf.json` in the current directory
///   or a parent)
/// - `RUST_LOG`: log filter (default directive: `labops=info`)
#[derive(Parser)]
#[command(name = "labops-run")]
#[command(about = "Write sample sheets for every sample of a sequencing run")]
struct Args {
    /// Run identifier, e.g. r84196_20250224_170647
    run_id: String,
    /// Sample list to append the resolved samples to
    #[arg(short, long, default_value = DEFAULT_SAMPLE_LIST)]
    list: PathBuf,
    /// Resolve and report only; write no sample sheet, run index or sample list
    #[arg(long)]
    dry_run: bool,
    #[arg(short, long, env = "LABOPS_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("labops=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config_path = resolve_config_path(args.config)?;
    let config = load_config(&config_path)?;
    tracing::info!("++ Using configuration {}", config_path.display());

    let services = CaseServices::from_config(&config)?;
    let mut processor = RunProcessor::new(config.core(), services);
    let options = RunOptions {
        sample_list: (!args.dry_run).then_some(args.list),
        write_sheets: !args.dry_run,
    };
    let report = processor.process(&args.run_id, &options)?;

    print_report(&report);
    if !report.is_clean() {
        anyhow::bail!(
            "{} well(s) of run {} could not be processed",
            report.failures.len(),
            args.run_id
        );
    }
    Ok(())
}

/// One line per resolved sample, in well order, then one per failed well.
fn print_report(report: &RunReport) {
    for sample in &report.samples {
        let status = sample.status();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            sample.well(),
            sample.name(),
            status.status,
            status.role,
            status.gender.map_or("unknown", |g| g.as_str()),
            status
                .affected
                .map_or("unknown", |a| if a { "affected" } else { "unaffected" }),
        );
    }
    for failure in &report.failures {
        eprintln!(
            "{}\t{}\t{}",
            failure.well,
            failure.sample.as_deref().unwrap_or("-"),
            failure.error
        );
    }
    if let Some(index) = &report.index {
        println!("{}", index.display());
    }
}
