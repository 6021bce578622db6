// Monthly aggregation and ranking over daily per-region records.
//
// Every function here is pure: the same slice in gives the same output, and
// nothing is cached between calls.
use crate::error::{AggregateError, AggregateResult};
use crate::types::{
    DailyRecord, HospitalizationLevel, LevelShare, Metric, MonthKey, MonthlyMatrix,
    MonthlySummary, PeakMonth, RegionOverview, RegionRanking, RegionTotal, Total, YearMonth,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Split records into usable ones and rejections, applying the same rule as
/// [`DailyRecord::new`]. Rejections carry the record's position in `records`.
pub fn partition_valid(records: Vec<DailyRecord>) -> (Vec<DailyRecord>, Vec<AggregateError>) {
    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (index, r) in records.into_iter().enumerate() {
        match DailyRecord::new(r.region, r.date, r.deaths, r.cases, r.hospitalized) {
            Ok(r) => valid.push(r),
            Err(e) => rejected.push(e.at_index(index)),
        }
    }
    (valid, rejected)
}

/// Bucket records by (region, year, month). Output is ordered by key.
pub fn summarize(records: &[DailyRecord]) -> Vec<MonthlySummary> {
    #[derive(Default)]
    struct Acc {
        deaths: i64,
        cases: i64,
        hospitalized_sum: f64,
        hospitalized_days: usize,
        days: usize,
    }

    let mut map: BTreeMap<MonthKey, Acc> = BTreeMap::new();
    for r in records {
        let e = map.entry(MonthKey::of(r)).or_default();
        e.deaths += r.deaths;
        e.cases += r.cases;
        e.days += 1;
        if let Some(h) = r.hospitalized {
            e.hospitalized_sum += h;
            e.hospitalized_days += 1;
        }
    }

    map.into_iter()
        .map(|(key, acc)| MonthlySummary {
            key,
            deaths_sum: acc.deaths,
            cases_sum: acc.cases,
            hospitalized_avg: if acc.hospitalized_days == 0 {
                None
            } else {
                Some(acc.hospitalized_sum / acc.hospitalized_days as f64)
            },
            days: acc.days,
            hospitalized_days: acc.hospitalized_days,
        })
        .collect()
}

/// Month with the highest `metric` for `region`; ties go to the earliest month.
pub fn peak_month(
    summaries: &[MonthlySummary],
    region: &str,
    metric: Metric,
) -> AggregateResult<MonthKey> {
    let mut best: Option<(&MonthKey, f64)> = None;
    for s in summaries.iter().filter(|s| s.key.region == region) {
        let Some(v) = s.value(metric) else { continue };
        best = match best {
            None => Some((&s.key, v)),
            Some((k, bv)) => {
                let better = match v.total_cmp(&bv) {
                    Ordering::Greater => true,
                    Ordering::Equal => s.key.year_month() < k.year_month(),
                    Ordering::Less => false,
                };
                if better {
                    Some((&s.key, v))
                } else {
                    Some((k, bv))
                }
            }
        };
    }
    best.map(|(k, _)| k.clone()).ok_or_else(|| {
        AggregateError::EmptyInput(format!("no {} summaries for region '{}'", metric, region))
    })
}

/// Per-region totals over the whole series, largest first, ties by name.
/// Deaths and cases are exact counts; hospitalizations sum the defined daily
/// values (patient-days).
pub fn rank_regions(records: &[DailyRecord], metric: Metric) -> RegionRanking {
    let mut totals: HashMap<&str, Total> = HashMap::new();
    for r in records {
        let e = totals.entry(r.region.as_str()).or_insert(match metric {
            Metric::Hospitalized => Total::Amount(0.0),
            _ => Total::Count(0),
        });
        *e = match *e {
            Total::Count(n) if metric == Metric::Deaths => Total::Count(n + r.deaths),
            Total::Count(n) => Total::Count(n + r.cases),
            Total::Amount(v) => Total::Amount(v + r.hospitalized.unwrap_or(0.0)),
        };
    }
    sorted_ranking(totals)
}

/// Per-region largest single daily value, largest first, ties by name.
/// Regions with no defined hospitalization value are left out of a
/// `Hospitalized` ranking.
pub fn rank_regions_by_max(records: &[DailyRecord], metric: Metric) -> RegionRanking {
    let mut peaks: HashMap<&str, Total> = HashMap::new();
    for r in records {
        let value = match metric {
            Metric::Deaths => Total::Count(r.deaths),
            Metric::Cases => Total::Count(r.cases),
            Metric::Hospitalized => match r.hospitalized {
                Some(h) => Total::Amount(h),
                None => continue,
            },
        };
        peaks
            .entry(r.region.as_str())
            .and_modify(|best| {
                if value.total_cmp(best) == Ordering::Greater {
                    *best = value;
                }
            })
            .or_insert(value);
    }
    sorted_ranking(peaks)
}

fn sorted_ranking(totals: HashMap<&str, Total>) -> RegionRanking {
    let mut ranking: RegionRanking = totals
        .into_iter()
        .map(|(region, total)| RegionTotal {
            region: region.to_string(),
            total,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.region.cmp(&b.region))
    });
    ranking
}

pub fn top_regions(ranking: &[RegionTotal], n: usize) -> Vec<String> {
    ranking.iter().take(n).map(|r| r.region.clone()).collect()
}

/// One peak per region, in region order. Regions without a candidate bucket
/// (only possible for hospitalizations) are left out.
pub fn peak_months(summaries: &[MonthlySummary], metric: Metric) -> Vec<PeakMonth> {
    let regions: BTreeSet<&str> = summaries.iter().map(|s| s.key.region.as_str()).collect();
    let mut out = Vec::new();
    for region in regions {
        match peak_month(summaries, region, metric) {
            Ok(key) => {
                let value = summaries
                    .iter()
                    .find(|s| s.key == key)
                    .and_then(|s| s.value(metric))
                    .unwrap_or(0.0);
                out.push(PeakMonth { key, value });
            }
            Err(e) => log::debug!("peak_months: skipping {region}: {e}"),
        }
    }
    out
}

pub fn region_overviews(summaries: &[MonthlySummary]) -> Vec<RegionOverview> {
    let mut totals: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for s in summaries {
        let e = totals.entry(s.key.region.as_str()).or_default();
        e.0 += s.deaths_sum;
        e.1 += s.cases_sum;
    }
    totals
        .into_iter()
        .map(|(region, (deaths, cases))| RegionOverview {
            region: region.to_string(),
            total_deaths: deaths,
            total_cases: cases,
            peak_deaths: peak_month(summaries, region, Metric::Deaths)
                .ok()
                .map(|k| k.year_month()),
            peak_cases: peak_month(summaries, region, Metric::Cases)
                .ok()
                .map(|k| k.year_month()),
        })
        .collect()
}

/// Pivot `regions` (rows, in the given order with repeats dropped) against
/// every month any of them has a summary for.
pub fn monthly_matrix(
    summaries: &[MonthlySummary],
    regions: &[String],
    metric: Metric,
) -> MonthlyMatrix {
    let mut seen = HashSet::new();
    let regions: Vec<String> = regions
        .iter()
        .filter(|r| seen.insert(r.as_str()))
        .cloned()
        .collect();
    let wanted: HashMap<&str, usize> = regions
        .iter()
        .enumerate()
        .map(|(i, r)| (r.as_str(), i))
        .collect();
    let selected: Vec<&MonthlySummary> = summaries
        .iter()
        .filter(|s| wanted.contains_key(s.key.region.as_str()))
        .collect();

    let columns: Vec<YearMonth> = selected
        .iter()
        .map(|s| s.key.year_month())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let col_index: HashMap<YearMonth, usize> =
        columns.iter().enumerate().map(|(i, c)| (*c, i)).collect();

    let mut cells = vec![vec![None; columns.len()]; regions.len()];
    for s in selected {
        let row = wanted[s.key.region.as_str()];
        let col = col_index[&s.key.year_month()];
        cells[row][col] = s.value(metric);
    }

    MonthlyMatrix {
        metric,
        regions,
        columns,
        cells,
    }
}

/// Count how many records fall into each hospitalization level per month and
/// what fraction of that month's classified records each level represents.
pub fn hospitalization_level_shares(records: &[DailyRecord]) -> Vec<LevelShare> {
    use chrono::Datelike;

    let mut counts: BTreeMap<YearMonth, [usize; 4]> = BTreeMap::new();
    for r in records {
        let Some(level) = r.hospitalized.and_then(HospitalizationLevel::classify) else {
            continue;
        };
        let period = YearMonth {
            year: r.date.year(),
            month: r.date.month(),
        };
        counts.entry(period).or_default()[level as usize] += 1;
    }

    let mut out = Vec::new();
    for (period, per_level) in counts {
        let month_total: usize = per_level.iter().sum();
        for level in HospitalizationLevel::ALL {
            let count = per_level[level as usize];
            out.push(LevelShare {
                period,
                level,
                count,
                share: count as f64 / month_total as f64,
            });
        }
    }
    out
}
