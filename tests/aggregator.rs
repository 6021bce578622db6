use chrono::NaiveDate;
use covid_report::aggregator::{peak_month, rank_regions, summarize};
use covid_report::types::{DailyRecord, Metric};
use std::collections::HashSet;

fn rec(region: &str, date: &str, deaths: i64, cases: i64) -> DailyRecord {
    DailyRecord {
        region: region.into(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date"),
        deaths,
        cases,
        hospitalized: None,
    }
}

/// A few regions spread over several months, with uneven days.
fn sample() -> Vec<DailyRecord> {
    let mut out = Vec::new();
    for (i, region) in ["CA", "NY", "TX", "FL"].iter().enumerate() {
        for day in 0..75i64 {
            let date = NaiveDate::from_ymd_opt(2020, 11, 1).unwrap() + chrono::Duration::days(day * (i as i64 + 1));
            out.push(DailyRecord {
                region: region.to_string(),
                date,
                deaths: (day * 7 + i as i64) % 23,
                cases: (day * 31 + 5) % 997,
                hospitalized: if day % 3 == 0 { None } else { Some((day * 13 % 400) as f64) },
            });
        }
    }
    out
}

#[test]
fn monthly_sums_preserve_totals() {
    let data = sample();
    let summaries = summarize(&data);
    let in_deaths: i64 = data.iter().map(|r| r.deaths).sum();
    let in_cases: i64 = data.iter().map(|r| r.cases).sum();
    assert_eq!(summaries.iter().map(|s| s.deaths_sum).sum::<i64>(), in_deaths);
    assert_eq!(summaries.iter().map(|s| s.cases_sum).sum::<i64>(), in_cases);
    assert_eq!(summaries.iter().map(|s| s.days).sum::<usize>(), data.len());
}

#[test]
fn month_keys_are_unique_and_sorted() {
    let summaries = summarize(&sample());
    let keys: HashSet<_> = summaries.iter().map(|s| s.key.clone()).collect();
    assert_eq!(keys.len(), summaries.len());
    assert!(summaries.windows(2).all(|w| w[0].key < w[1].key));
}

#[test]
fn summarize_is_idempotent_and_order_independent() {
    let data = sample();
    let mut reversed = data.clone();
    reversed.reverse();
    assert_eq!(summarize(&data), summarize(&data));
    assert_eq!(summarize(&data), summarize(&reversed));
}

#[test]
fn ranking_is_descending_and_order_independent() {
    let data = sample();
    let mut reversed = data.clone();
    reversed.reverse();
    for metric in [Metric::Deaths, Metric::Cases, Metric::Hospitalized] {
        let ranking = rank_regions(&data, metric);
        assert!(ranking.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(ranking, rank_regions(&reversed, metric));
    }
}

#[test]
fn worked_example() {
    let data = vec![
        rec("CA", "2021-01-05", 3, 0),
        rec("CA", "2021-01-20", 5, 0),
        rec("CA", "2021-02-01", 1, 0),
    ];
    let summaries = summarize(&data);
    let got: Vec<(String, i32, u32, i64)> = summaries
        .iter()
        .map(|s| (s.key.region.clone(), s.key.year, s.key.month, s.deaths_sum))
        .collect();
    assert_eq!(
        got,
        vec![("CA".to_string(), 2021, 1, 8), ("CA".to_string(), 2021, 2, 1)]
    );
    let peak = peak_month(&summaries, "CA", Metric::Deaths).unwrap();
    assert_eq!((peak.year, peak.month), (2021, 1));
}

#[test]
fn single_record_region_peaks_on_its_month() {
    let summaries = summarize(&[rec("VT", "2020-06-14", 0, 0)]);
    let peak = peak_month(&summaries, "VT", Metric::Deaths).unwrap();
    assert_eq!((peak.region.as_str(), peak.year, peak.month), ("VT", 2020, 6));
}

#[test]
fn empty_input_gives_empty_outputs() {
    assert!(summarize(&[]).is_empty());
    assert!(rank_regions(&[], Metric::Deaths).is_empty());
    assert!(peak_month(&[], "CA", Metric::Cases).is_err());
}

#[test]
fn equal_totals_rank_alphabetically() {
    let data = vec![
        rec("TX", "2020-05-01", 4, 0),
        rec("TX", "2020-06-01", 6, 0),
        rec("NY", "2020-05-01", 10, 0),
    ];
    let ranking = rank_regions(&data, Metric::Deaths);
    assert_eq!(ranking[0].region, "NY");
    assert_eq!(ranking[1].region, "TX");
    assert_eq!(ranking[0].total, ranking[1].total);
}
