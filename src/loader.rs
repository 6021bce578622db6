use crate::error::AggregateError;
use crate::regions::RegionNames;
use crate::types::{DailyRecord, RawDailyRow, RawDate};
use crate::util::parse_yyyymmdd;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub rejected: Vec<AggregateError>,
}

impl LoadReport {
    pub fn rejected_rows(&self) -> usize {
        self.rejected.len()
    }
}

/// Read a `states/daily.json` export and normalize it. Only a file that is
/// missing or not a JSON array fails as a whole; bad rows are rejected one by
/// one.
pub fn load_daily(
    path: impl AsRef<Path>,
    names: Option<&RegionNames>,
) -> Result<(Vec<DailyRecord>, LoadReport)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading dataset {}", path.display()))?;
    let rows: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("parsing dataset {}", path.display()))?;
    Ok(normalize(rows, names))
}

/// Turn raw JSON rows into records. A bad row is rejected on its own; the rest
/// of the batch still goes through.
///
/// With a name mapping, region codes are replaced by display names and codes
/// missing from the mapping are rejected. Without one the trimmed code is
/// kept as the region.
pub fn normalize(rows: Vec<Value>, names: Option<&RegionNames>) -> (Vec<DailyRecord>, LoadReport) {
    let total_rows = rows.len();
    let mut records = Vec::with_capacity(total_rows);
    let mut rejected = Vec::new();

    for (index, value) in rows.into_iter().enumerate() {
        match normalize_row(value, names) {
            Ok(r) => records.push(r),
            Err(e) => {
                let err = e.at_index(index);
                log::warn!("rejected row: {err}");
                rejected.push(err);
            }
        }
    }

    let report = LoadReport {
        total_rows,
        accepted_rows: records.len(),
        rejected,
    };
    log::info!(
        "loaded rows={} accepted={} rejected={}",
        report.total_rows,
        report.accepted_rows,
        report.rejected_rows()
    );
    (records, report)
}

fn normalize_row(value: Value, names: Option<&RegionNames>) -> Result<DailyRecord, AggregateError> {
    let reject = |region: &str, reason: String| AggregateError::InvalidRecord {
        index: 0,
        region: region.to_string(),
        reason,
    };

    let shown = value.get("state").and_then(Value::as_str).unwrap_or("").trim().to_string();
    let row: RawDailyRow =
        serde_json::from_value(value).map_err(|e| reject(&shown, e.to_string()))?;
    let code = row.state.as_deref().unwrap_or("").trim();

    let date = match &row.date {
        Some(RawDate::Number(n)) => parse_yyyymmdd(&n.to_string()),
        Some(RawDate::Text(s)) => parse_yyyymmdd(s),
        None => None,
    }
    .ok_or_else(|| reject(code, format!("malformed date {:?}", row.date)))?;

    let region = match names {
        Some(names) if !code.is_empty() => names
            .get(code)
            .ok_or_else(|| reject(code, "unknown region code".to_string()))?
            .to_string(),
        _ => code.to_string(),
    };

    DailyRecord::new(
        region,
        date,
        row.death_increase.unwrap_or(0),
        row.positive_increase.unwrap_or(0),
        row.hospitalized_currently,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows(json: &str) -> Vec<Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn maps_codes_and_keeps_good_rows() {
        let data = rows(
            r#"[
                {"date": 20210105, "state": "CA", "deathIncrease": 3, "positiveIncrease": 40, "hospitalizedCurrently": 21000, "totalTestResults": 1},
                {"date": "20210106", "state": "NY", "deathIncrease": null, "positiveIncrease": 7, "hospitalizedCurrently": null}
            ]"#,
        );
        let names: RegionNames = vec![
            ("CA".to_string(), "California".to_string()),
            ("NY".to_string(), "New York".to_string()),
        ]
        .into_iter()
        .collect();
        let (records, report) = normalize(data, Some(&names));
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.rejected_rows(), 0);
        assert_eq!(records[0].region, "California");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2021, 1, 5).unwrap());
        assert_eq!(records[0].hospitalized, Some(21000.0));
        assert_eq!(records[1].deaths, 0);
        assert_eq!(records[1].hospitalized, None);
    }

    #[test]
    fn rejects_bad_rows_without_aborting() {
        let data = rows(
            r#"[
                {"date": 20210230, "state": "CA", "deathIncrease": 1},
                {"date": 20210201, "state": "", "deathIncrease": 1},
                {"date": 20210201, "state": "PR", "deathIncrease": 1},
                {"date": 20210201, "state": "CA", "deathIncrease": 2}
            ]"#,
        );
        let names: RegionNames = vec![("CA".to_string(), "California".to_string())]
            .into_iter()
            .collect();
        let (records, report) = normalize(data, Some(&names));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].deaths, 2);
        assert_eq!(report.accepted_rows, 1);
        let indices: Vec<usize> = report
            .rejected
            .iter()
            .map(|e| match e {
                AggregateError::InvalidRecord { index, .. } => *index,
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn without_mapping_codes_are_kept() {
        let data = rows(r#"[{"date": 20200401, "state": " wa ", "positiveIncrease": 5}]"#);
        let (records, report) = normalize(data, None);
        assert_eq!(report.rejected_rows(), 0);
        assert_eq!(records[0].region, "wa");
        assert_eq!(records[0].cases, 5);
    }

    #[test]
    fn wrongly_typed_fields_reject_only_their_row() {
        let data = rows(
            r#"[
                {"date": 20210104, "state": "CA", "deathIncrease": 1},
                {"date": 20210105.0, "state": "CA", "deathIncrease": 1},
                {"date": 20210105, "state": 7, "deathIncrease": 1},
                {"date": 20210105, "state": "NY", "deathIncrease": "3"},
                {"date": true, "state": "NY"},
                {"date": 20210106, "state": "NY", "deathIncrease": 2}
            ]"#,
        );
        let (records, report) = normalize(data, None);
        assert_eq!(records.len(), 2);
        assert_eq!(report.rejected_rows(), 4);
        match &report.rejected[2] {
            AggregateError::InvalidRecord { index, region, .. } => {
                assert_eq!(*index, 3);
                assert_eq!(region, "NY");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
