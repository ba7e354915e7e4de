//! Insulin doses and the append-only dose log

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use log::info;
use serde::Serialize;

use crate::error::GlucoTrackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsulinKind {
    Rapid,
    Long,
}

impl InsulinKind {
    pub const ALL: [InsulinKind; 2] = [InsulinKind::Rapid, InsulinKind::Long];

    pub fn label(self) -> &'static str {
        match self {
            InsulinKind::Rapid => "Rapid-acting",
            InsulinKind::Long => "Long-acting",
        }
    }
}

impl FromStr for InsulinKind {
    type Err = GlucoTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rapid" => Ok(InsulinKind::Rapid),
            "long" => Ok(InsulinKind::Long),
            other => Err(GlucoTrackError::Config(format!("unknown insulin kind '{}'", other))),
        }
    }
}

/// Identity of a logged dose, assigned on append and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DoseId(pub u64);

impl fmt::Display for DoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsulinDose {
    pub id: DoseId,
    pub units: f64,
    pub kind: InsulinKind,
    pub timestamp: NaiveDateTime,
}

/// Doses in entry order
///
/// Entries are only ever appended or removed. Two doses logged at the same
/// instant stay distinct because removal goes through [`DoseId`].
#[derive(Debug, Clone, Default)]
pub struct DoseLog {
    doses: Vec<InsulinDose>,
    next_id: u64,
}

impl DoseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dose, returning its new id
    pub fn add(&mut self, units: f64, kind: InsulinKind, timestamp: NaiveDateTime) -> Result<DoseId, GlucoTrackError> {
        if !units.is_finite() || units < 0.0 {
            return Err(GlucoTrackError::InvalidUnits(units.to_string()));
        }
        let id = DoseId(self.next_id);
        self.next_id += 1;
        self.doses.push(InsulinDose { id, units, kind, timestamp });
        info!("Logged {} {} units at {} as {}", units, kind.label(), timestamp, id);
        Ok(id)
    }

    /// Append a dose typed into a text field
    pub fn add_entry(&mut self, text: &str, kind: InsulinKind, timestamp: NaiveDateTime) -> Result<DoseId, GlucoTrackError> {
        let units = parse_units(text)?;
        self.add(units, kind, timestamp)
    }

    pub fn remove(&mut self, id: DoseId) -> Result<InsulinDose, GlucoTrackError> {
        let index = self
            .doses
            .iter()
            .position(|dose| dose.id == id)
            .ok_or(GlucoTrackError::DoseNotFound(id))?;
        let removed = self.doses.remove(index);
        info!("Removed dose {}", id);
        Ok(removed)
    }

    pub fn doses(&self) -> &[InsulinDose] {
        &self.doses
    }

    pub fn len(&self) -> usize {
        self.doses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    /// Snapshot of the doses within `[now - hours, now]`
    pub fn within(&self, hours: u32, now: NaiveDateTime) -> Vec<InsulinDose> {
        doses_within(&self.doses, hours, now).cloned().collect()
    }
}

/// Doses whose timestamp falls in `[now - hours, now]`, both ends inclusive
pub fn doses_within(doses: &[InsulinDose], hours: u32, now: NaiveDateTime) -> impl Iterator<Item = &InsulinDose> {
    let start = now - Duration::hours(i64::from(hours));
    doses
        .iter()
        .filter(move |dose| dose.timestamp >= start && dose.timestamp <= now)
}

/// Parse a units field as typed by the user
///
/// Accepts a finite non-negative decimal; a comma works as decimal separator.
pub fn parse_units(text: &str) -> Result<f64, GlucoTrackError> {
    let trimmed = text.trim();
    let units: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| GlucoTrackError::InvalidUnits(trimmed.to_string()))?;

    if !units.is_finite() || units < 0.0 {
        return Err(GlucoTrackError::InvalidUnits(trimmed.to_string()));
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_ids_are_unique_for_same_timestamp() {
        let mut log = DoseLog::new();
        let a = log.add(4.0, InsulinKind::Rapid, at(1, 8)).unwrap();
        let b = log.add(4.0, InsulinKind::Rapid, at(1, 8)).unwrap();
        assert_ne!(a, b);

        let removed = log.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(log.len(), 1);
        assert_eq!(log.doses()[0].id, b);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut log = DoseLog::new();
        let a = log.add(1.0, InsulinKind::Long, at(1, 22)).unwrap();
        log.remove(a).unwrap();
        let b = log.add(1.0, InsulinKind::Long, at(1, 22)).unwrap();
        assert_ne!(a, b);
        assert!(matches!(log.remove(a), Err(GlucoTrackError::DoseNotFound(id)) if id == a));
    }

    #[test]
    fn test_rejects_negative_units() {
        let mut log = DoseLog::new();
        assert!(log.add(-1.0, InsulinKind::Rapid, at(1, 8)).is_err());
        assert!(log.add(f64::NAN, InsulinKind::Rapid, at(1, 8)).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units(" 12 ").unwrap(), 12.0);
        assert_eq!(parse_units("7,5").unwrap(), 7.5);
        assert_eq!(parse_units("0").unwrap(), 0.0);
        assert!(parse_units("").is_err());
        assert!(parse_units("abc").is_err());
        assert!(parse_units("-3").is_err());
        assert!(parse_units("inf").is_err());
    }

    #[test]
    fn test_add_entry() {
        let mut log = DoseLog::new();
        log.add_entry("6.5", InsulinKind::Rapid, at(2, 13)).unwrap();
        assert!(matches!(
            log.add_entry("six", InsulinKind::Rapid, at(2, 13)),
            Err(GlucoTrackError::InvalidUnits(_))
        ));
        assert_eq!(log.doses()[0].units, 6.5);
    }

    #[test]
    fn test_window_is_inclusive() {
        let mut log = DoseLog::new();
        log.add(1.0, InsulinKind::Rapid, at(1, 12)).unwrap(); // exactly now - 24h
        log.add(2.0, InsulinKind::Rapid, at(1, 11)).unwrap(); // just outside
        log.add(3.0, InsulinKind::Long, at(2, 12)).unwrap(); // exactly now
        log.add(4.0, InsulinKind::Long, at(2, 13)).unwrap(); // future

        let kept: Vec<f64> = log.within(24, at(2, 12)).iter().map(|d| d.units).collect();
        assert_eq!(kept, vec![1.0, 3.0]);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Rapid".parse::<InsulinKind>().unwrap(), InsulinKind::Rapid);
        assert_eq!("long".parse::<InsulinKind>().unwrap(), InsulinKind::Long);
        assert!("basal".parse::<InsulinKind>().is_err());
    }
}
