use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::DerivedMeasurement;

/// Time window applied to a measurement series.
///
/// Serialized as its short code ("ALL", "3M", "1Y", "2024") everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TimeRange {
    /// Whole series
    #[default]
    All,
    /// One calendar year
    Year(i32),
    /// 90 days back from the last scan
    ThreeMonths,
    /// 365 days back from the last scan
    OneYear,
}

impl TimeRange {
    /// Rolling window length, for the rolling modes
    pub fn window(&self) -> Option<Duration> {
        match self {
            TimeRange::ThreeMonths => Some(Duration::days(90)),
            TimeRange::OneYear => Some(Duration::days(365)),
            TimeRange::All | TimeRange::Year(_) => None,
        }
    }

    /// Select the records of `series` inside this range.
    ///
    /// `series` must be sorted ascending; the result is a contiguous slice of
    /// it. Rolling windows are anchored on the last record of `series`, not on
    /// the current time, and include their lower bound.
    pub fn select<'a>(&self, series: &'a [DerivedMeasurement]) -> &'a [DerivedMeasurement] {
        match self {
            TimeRange::All => series,
            TimeRange::Year(year) => {
                let start = series.partition_point(|m| m.timestamp().year() < *year);
                let end = series.partition_point(|m| m.timestamp().year() <= *year);
                &series[start..end]
            }
            TimeRange::ThreeMonths | TimeRange::OneYear => {
                let (Some(last), Some(window)) = (series.last(), self.window()) else {
                    return series;
                };
                let cutoff = last.timestamp() - window;
                let start = series.partition_point(|m| m.timestamp() < cutoff);
                &series[start..]
            }
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::All => write!(f, "ALL"),
            TimeRange::Year(year) => write!(f, "{:04}", year),
            TimeRange::ThreeMonths => write!(f, "3M"),
            TimeRange::OneYear => write!(f, "1Y"),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_uppercase().as_str() {
            "ALL" => Ok(TimeRange::All),
            "3M" => Ok(TimeRange::ThreeMonths),
            "1Y" => Ok(TimeRange::OneYear),
            _ if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) => s
                .parse::<i32>()
                .map(TimeRange::Year)
                .map_err(|e| format!("Invalid year '{}': {}", s, e)),
            _ => Err(format!(
                "Invalid time range: {} (expected ALL, 3M, 1Y or a four-digit year)",
                s
            )),
        }
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

impl TryFrom<String> for TimeRange {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}
