use crate::error::{AggregateError, AggregateResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One row of the covidtracking `states/daily.json` export. Only the fields
/// the aggregator needs are kept; everything else in the object is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDailyRow {
    pub state: Option<String>,
    pub date: Option<RawDate>,
    #[serde(rename = "deathIncrease")]
    pub death_increase: Option<i64>,
    #[serde(rename = "positiveIncrease")]
    pub positive_increase: Option<i64>,
    #[serde(rename = "hospitalizedCurrently")]
    pub hospitalized_currently: Option<f64>,
}

/// The export writes dates as `20210307`; some mirrors quote them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub region: String,
    pub date: NaiveDate,
    pub deaths: i64,
    pub cases: i64,
    pub hospitalized: Option<f64>,
}

impl DailyRecord {
    /// Rejects a blank region. The error carries index 0; callers that know
    /// the row position fix it up with [`AggregateError::at_index`].
    pub fn new(
        region: impl Into<String>,
        date: NaiveDate,
        deaths: i64,
        cases: i64,
        hospitalized: Option<f64>,
    ) -> AggregateResult<Self> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(AggregateError::InvalidRecord {
                index: 0,
                region,
                reason: "empty region".to_string(),
            });
        }
        Ok(DailyRecord {
            region,
            date,
            deaths,
            cases,
            hospitalized,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthKey {
    pub region: String,
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(record: &DailyRecord) -> Self {
        use chrono::Datelike;
        MonthKey {
            region: record.region.clone(),
            year: record.date.year(),
            month: record.date.month(),
        }
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.region, self.year_month())
    }
}

/// Column key of a pivot matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub key: MonthKey,
    pub deaths_sum: i64,
    pub cases_sum: i64,
    pub hospitalized_avg: Option<f64>,
    pub days: usize,
    pub hospitalized_days: usize,
}

impl MonthlySummary {
    /// Value of `metric` for this bucket; `None` only for an undefined
    /// hospitalization average.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Deaths => Some(self.deaths_sum as f64),
            Metric::Cases => Some(self.cases_sum as f64),
            Metric::Hospitalized => self.hospitalized_avg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Deaths,
    Cases,
    Hospitalized,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Deaths => "deaths",
            Metric::Cases => "cases",
            Metric::Hospitalized => "hospitalized",
        };
        f.write_str(s)
    }
}

/// Ranking value: exact for counted metrics, floating for hospitalizations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Total {
    Count(i64),
    Amount(f64),
}

impl Total {
    pub fn as_f64(self) -> f64 {
        match self {
            Total::Count(n) => n as f64,
            Total::Amount(v) => v,
        }
    }

    /// Total order used for ranking; counts compare exactly.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Total::Count(a), Total::Count(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl PartialOrd for Total {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTotal {
    pub region: String,
    pub total: Total,
}

pub type RegionRanking = Vec<RegionTotal>;

#[derive(Debug, Clone, PartialEq)]
pub struct PeakMonth {
    pub key: MonthKey,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionOverview {
    pub region: String,
    pub total_deaths: i64,
    pub total_cases: i64,
    pub peak_deaths: Option<YearMonth>,
    pub peak_cases: Option<YearMonth>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMatrix {
    pub metric: Metric,
    pub regions: Vec<String>,
    pub columns: Vec<YearMonth>,
    /// `cells[row][col]` lines up with `regions[row]` and `columns[col]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl MonthlyMatrix {
    pub fn get(&self, region: &str, column: YearMonth) -> Option<f64> {
        let row = self.regions.iter().position(|r| r == region)?;
        let col = self.columns.iter().position(|c| *c == column)?;
        self.cells[row][col]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HospitalizationLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl HospitalizationLevel {
    pub const ALL: [HospitalizationLevel; 4] = [
        HospitalizationLevel::Low,
        HospitalizationLevel::Medium,
        HospitalizationLevel::High,
        HospitalizationLevel::VeryHigh,
    ];

    /// Right-closed bins (0, 1000], (1000, 5000], (5000, 10000], (10000, inf).
    pub fn classify(value: f64) -> Option<Self> {
        if value.is_nan() || value <= 0.0 {
            None
        } else if value <= 1_000.0 {
            Some(HospitalizationLevel::Low)
        } else if value <= 5_000.0 {
            Some(HospitalizationLevel::Medium)
        } else if value <= 10_000.0 {
            Some(HospitalizationLevel::High)
        } else {
            Some(HospitalizationLevel::VeryHigh)
        }
    }
}

impl fmt::Display for HospitalizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HospitalizationLevel::Low => "Low",
            HospitalizationLevel::Medium => "Medium",
            HospitalizationLevel::High => "High",
            HospitalizationLevel::VeryHigh => "VeryHigh",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelShare {
    pub period: YearMonth,
    pub level: HospitalizationLevel,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Serialize, Clone)]
pub struct MonthlySummaryRow {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Deaths")]
    pub deaths: String,
    #[serde(rename = "Cases")]
    pub cases: String,
    #[serde(rename = "AvgHospitalized")]
    pub avg_hospitalized: String,
    #[serde(rename = "Days")]
    pub days: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct PeakMonthRow {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "PeakMonth")]
    pub peak_month: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct RegionOverviewRow {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "TotalDeaths")]
    pub total_deaths: String,
    #[serde(rename = "TotalCases")]
    pub total_cases: String,
    #[serde(rename = "PeakDeathsMonth")]
    pub peak_deaths_month: String,
    #[serde(rename = "PeakCasesMonth")]
    pub peak_cases_month: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct LevelShareRow {
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub rejected_records: usize,
    pub total_regions: usize,
    pub months_covered: usize,
    pub total_deaths: i64,
    pub total_cases: i64,
    pub ranking_metric: Metric,
    pub top_regions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_region() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap();
        let ok = DailyRecord::new("CA", date, 3, 40, None).unwrap();
        assert_eq!(ok.region, "CA");
        let err = DailyRecord::new(" ", date, 3, 40, None).unwrap_err();
        assert_eq!(
            err.at_index(7),
            AggregateError::InvalidRecord {
                index: 7,
                region: " ".into(),
                reason: "empty region".into(),
            }
        );
    }

    #[test]
    fn counts_compare_exactly() {
        let big = Total::Count(9_007_199_254_740_993);
        let smaller = Total::Count(9_007_199_254_740_992);
        assert_eq!(big.total_cmp(&smaller), Ordering::Greater);
        assert!(Total::Amount(2.5) > Total::Count(2));
    }
}
