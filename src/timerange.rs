//! Selectable time windows
//!
//! Glucose charts offer 2h through 14d; the insulin report offers every
//! window, out to a full year. Every window maps to a length in hours and a default
//! chart interval in minutes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::GlucoTrackError;

/// One row of the time-window catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRangeSpec {
    pub token: &'static str,
    pub label: &'static str,
    pub hours: u32,
    pub default_interval_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum TimeRange {
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "12h")]
    #[default]
    TwelveHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    OneWeek,
    #[serde(rename = "14d")]
    TwoWeeks,
    #[serde(rename = "30d")]
    OneMonth,
    #[serde(rename = "90d")]
    ThreeMonths,
    #[serde(rename = "180d")]
    SixMonths,
    #[serde(rename = "365d")]
    OneYear,
}

impl TimeRange {
    /// Full catalog, ascending by hours
    pub const ALL: [TimeRange; 9] = [
        TimeRange::TwoHours,
        TimeRange::TwelveHours,
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::TwoWeeks,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::OneYear,
    ];

    /// Windows offered on the glucose chart
    pub const GLUCOSE: [TimeRange; 5] = [
        TimeRange::TwoHours,
        TimeRange::TwelveHours,
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::TwoWeeks,
    ];

    pub fn spec(self) -> TimeRangeSpec {
        let (token, label, hours, default_interval_minutes) = match self {
            TimeRange::TwoHours => ("2h", "2 hours", 2, 10),
            TimeRange::TwelveHours => ("12h", "12 hours", 12, 30),
            TimeRange::OneDay => ("24h", "24 hours", 24, 60),
            TimeRange::OneWeek => ("7d", "7 days", 168, 240),
            TimeRange::TwoWeeks => ("14d", "14 days", 336, 720),
            TimeRange::OneMonth => ("30d", "30 days", 720, 1440),
            TimeRange::ThreeMonths => ("90d", "90 days", 2160, 4320),
            TimeRange::SixMonths => ("180d", "180 days", 4320, 10080),
            TimeRange::OneYear => ("365d", "365 days", 8760, 20160),
        };
        TimeRangeSpec { token, label, hours, default_interval_minutes }
    }

    pub fn hours(self) -> u32 {
        self.spec().hours
    }

    pub fn token(self) -> &'static str {
        self.spec().token
    }

    pub fn is_glucose_range(self) -> bool {
        Self::GLUCOSE.contains(&self)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TimeRange {
    type Err = GlucoTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|range| range.token() == token)
            .ok_or_else(|| GlucoTrackError::UnknownTimeRange(token.to_string()))
    }
}
