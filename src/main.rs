// Entry point: load the daily export, aggregate it and write the reports.
use anyhow::Result;
use clap::Parser;
use covid_report::loader::load_daily;
use covid_report::pipeline::{generate_reports, ReportOptions};
use covid_report::regions::RegionNames;
use covid_report::types::Metric;
use covid_report::util::format_int;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "covid_report")]
#[command(about = "Monthly COVID-19 summaries and rankings per state", long_about = None)]
struct Cli {
    /// covidtracking `states/daily.json` export
    #[arg(short, long, default_value = "daily.json")]
    input: PathBuf,

    /// CSV with `code,name` columns used to replace region codes
    #[arg(short, long)]
    regions: Option<PathBuf>,

    /// Directory the CSV/JSON reports are written to
    #[arg(short, long, default_value = "reports")]
    out_dir: PathBuf,

    /// How many regions go into the top-N selection and the month matrix
    #[arg(short, long, default_value_t = 10)]
    top: usize,

    /// Metric used for ranking, peak months and the month matrix
    #[arg(short, long, value_enum, default_value_t = Metric::Deaths)]
    metric: Metric,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let names = cli.regions.as_ref().map(RegionNames::from_path).transpose()?;
    if let Some(n) = &names {
        log::info!("region names loaded: {}", n.len());
    }

    let (records, load) = load_daily(&cli.input, names.as_ref())?;
    if load.rejected_rows() > 0 {
        log::warn!(
            "{} of {} rows rejected",
            format_int(load.rejected_rows()),
            format_int(load.total_rows)
        );
    }

    let opts = ReportOptions {
        out_dir: cli.out_dir,
        metric: cli.metric,
        top: cli.top,
    };
    let summary = generate_reports(&records, &load, &opts)?;
    log::info!(
        "done: regions={} months={} top={:?}",
        summary.total_regions,
        summary.months_covered,
        summary.top_regions
    );
    Ok(())
}
