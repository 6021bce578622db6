use crate::aggregator::{region_overviews, top_regions};
use crate::loader::LoadReport;
use crate::types::{
    LevelShare, LevelShareRow, Metric, MonthlyMatrix, MonthlySummary, MonthlySummaryRow,
    PeakMonth, PeakMonthRow, RegionOverviewRow, RegionTotal, RankingRow, SummaryStats, Total,
};
use crate::util::{format_int, format_number, format_optional};
use std::collections::BTreeSet;

fn metric_decimals(metric: Metric) -> usize {
    match metric {
        Metric::Deaths | Metric::Cases => 0,
        Metric::Hospitalized => 2,
    }
}

pub fn monthly_rows(summaries: &[MonthlySummary]) -> Vec<MonthlySummaryRow> {
    summaries
        .iter()
        .map(|s| MonthlySummaryRow {
            region: s.key.region.clone(),
            month: s.key.year_month().to_string(),
            deaths: format_int(s.deaths_sum),
            cases: format_int(s.cases_sum),
            avg_hospitalized: format_optional(s.hospitalized_avg, 2),
            days: s.days,
        })
        .collect()
}

pub fn ranking_rows(ranking: &[RegionTotal]) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, r)| RankingRow {
            rank: idx + 1,
            region: r.region.clone(),
            total: match r.total {
                Total::Count(n) => format_int(n),
                Total::Amount(v) => format_number(v, 2),
            },
        })
        .collect()
}

pub fn peak_rows(peaks: &[PeakMonth], metric: Metric) -> Vec<PeakMonthRow> {
    peaks
        .iter()
        .map(|p| PeakMonthRow {
            region: p.key.region.clone(),
            peak_month: p.key.year_month().to_string(),
            value: format_number(p.value, metric_decimals(metric)),
        })
        .collect()
}

pub fn overview_rows(summaries: &[MonthlySummary]) -> Vec<RegionOverviewRow> {
    region_overviews(summaries)
        .into_iter()
        .map(|o| RegionOverviewRow {
            region: o.region,
            total_deaths: format_int(o.total_deaths),
            total_cases: format_int(o.total_cases),
            peak_deaths_month: o.peak_deaths.map(|m| m.to_string()).unwrap_or_default(),
            peak_cases_month: o.peak_cases.map(|m| m.to_string()).unwrap_or_default(),
        })
        .collect()
}

pub fn level_share_rows(shares: &[LevelShare]) -> Vec<LevelShareRow> {
    shares
        .iter()
        .map(|s| LevelShareRow {
            month: s.period.to_string(),
            level: s.level.to_string(),
            count: s.count,
            share_pct: format_number(s.share * 100.0, 2),
        })
        .collect()
}

/// Header plus one record per region; empty cells where a month is missing.
pub fn matrix_records(matrix: &MonthlyMatrix) -> Vec<Vec<String>> {
    let decimals = metric_decimals(matrix.metric);
    let mut header = vec!["Region".to_string()];
    header.extend(matrix.columns.iter().map(|c| c.to_string()));

    let mut out = vec![header];
    for (region, row) in matrix.regions.iter().zip(&matrix.cells) {
        let mut rec = vec![region.clone()];
        rec.extend(row.iter().map(|v| format_optional(*v, decimals)));
        out.push(rec);
    }
    out
}

pub fn generate_summary(
    summaries: &[MonthlySummary],
    ranking: &[RegionTotal],
    metric: Metric,
    top: usize,
    load: &LoadReport,
) -> SummaryStats {
    let regions: BTreeSet<&str> = summaries.iter().map(|s| s.key.region.as_str()).collect();
    let months: BTreeSet<_> = summaries.iter().map(|s| s.key.year_month()).collect();
    SummaryStats {
        total_records: load.accepted_rows,
        rejected_records: load.rejected_rows(),
        total_regions: regions.len(),
        months_covered: months.len(),
        total_deaths: summaries.iter().map(|s| s.deaths_sum).sum(),
        total_cases: summaries.iter().map(|s| s.cases_sum).sum(),
        ranking_metric: metric,
        top_regions: top_regions(ranking, top),
    }
}
