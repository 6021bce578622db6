// Wires the aggregator to the report writers: one call produces every output
// file for an already-loaded batch of records.
use crate::aggregator::{
    hospitalization_level_shares, monthly_matrix, peak_months, rank_regions,
    rank_regions_by_max, summarize, top_regions,
};
use crate::error::AggregateError;
use crate::loader::LoadReport;
use crate::output::{write_csv, write_csv_records, write_json};
use crate::reports;
use crate::types::{DailyRecord, Metric, SummaryStats};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const MONTHLY_FILE: &str = "monthly_summary.csv";
pub const RANKING_FILE: &str = "region_ranking.csv";
pub const PEAKS_FILE: &str = "peak_months.csv";
pub const OVERVIEW_FILE: &str = "region_overview.csv";
pub const MATRIX_FILE: &str = "monthly_matrix.csv";
pub const LEVELS_FILE: &str = "hospitalization_levels.csv";
pub const PEAK_RANKING_FILE: &str = "region_peak_ranking.csv";
pub const HOSPITALIZATION_MATRIX_FILE: &str = "hospitalization_matrix.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub out_dir: PathBuf,
    pub metric: Metric,
    pub top: usize,
}

pub fn generate_reports(
    records: &[DailyRecord],
    load: &LoadReport,
    opts: &ReportOptions,
) -> Result<SummaryStats> {
    if records.is_empty() {
        return Err(AggregateError::EmptyInput("no valid records to aggregate".to_string()).into());
    }
    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating output dir {}", opts.out_dir.display()))?;
    let out = |name: &str| opts.out_dir.join(name);

    let summaries = summarize(records);
    log::info!(
        "aggregated records={} into monthly buckets={}",
        records.len(),
        summaries.len()
    );
    write_csv(&out(MONTHLY_FILE), &reports::monthly_rows(&summaries))?;

    let ranking = rank_regions(records, opts.metric);
    write_csv(&out(RANKING_FILE), &reports::ranking_rows(&ranking))?;

    let by_peak = rank_regions_by_max(records, opts.metric);
    write_csv(&out(PEAK_RANKING_FILE), &reports::ranking_rows(&by_peak))?;

    let peaks = peak_months(&summaries, opts.metric);
    write_csv(&out(PEAKS_FILE), &reports::peak_rows(&peaks, opts.metric))?;

    write_csv(&out(OVERVIEW_FILE), &reports::overview_rows(&summaries))?;

    let top = top_regions(&ranking, opts.top);
    let matrix = monthly_matrix(&summaries, &top, opts.metric);
    write_csv_records(&out(MATRIX_FILE), &reports::matrix_records(&matrix))?;

    // Monthly mean hospitalizations for every region, not only the top N.
    let all_regions: Vec<String> = summaries
        .iter()
        .map(|s| s.key.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let hospitalized = monthly_matrix(&summaries, &all_regions, Metric::Hospitalized);
    write_csv_records(
        &out(HOSPITALIZATION_MATRIX_FILE),
        &reports::matrix_records(&hospitalized),
    )?;

    let shares = hospitalization_level_shares(records);
    write_csv(&out(LEVELS_FILE), &reports::level_share_rows(&shares))?;

    let summary = reports::generate_summary(&summaries, &ranking, opts.metric, opts.top, load);
    write_json(&out(SUMMARY_FILE), &summary)?;
    Ok(summary)
}
