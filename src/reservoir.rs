//! Insulin reservoir accounting
//!
//! Turns the dose log into "how many pens have I emptied, and how far into
//! the current one am I" for a reporting window.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::device::DeviceSelection;
use crate::insulin::{doses_within, InsulinDose, InsulinKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservoirSummary {
    pub kind: InsulinKind,
    pub units_used: f64,
    pub dose_count: usize,
    pub devices_exhausted: u32,
    pub current_device_fill_pct: f64,
}

/// Reservoir usage for both insulin kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservoirReport {
    pub window_hours: u32,
    pub rapid: ReservoirSummary,
    pub long: ReservoirSummary,
}

/// Account the `kind` doses within `[now - window_hours, now]` against a device
///
/// A capacity of 0 (custom device not set) leaves exhaustion and fill at 0.
pub fn account_for(
    doses: &[InsulinDose],
    kind: InsulinKind,
    window_hours: u32,
    capacity_units: f64,
    now: NaiveDateTime,
) -> ReservoirSummary {
    let (units_used, dose_count) = doses_within(doses, window_hours, now)
        .filter(|dose| dose.kind == kind)
        .fold((0.0, 0), |(units, count), dose| (units + dose.units, count + 1));

    let (devices_exhausted, current_device_fill_pct) = if capacity_units > 0.0 {
        (
            (units_used / capacity_units).floor() as u32,
            100.0 * (units_used % capacity_units) / capacity_units,
        )
    } else {
        (0, 0.0)
    };

    ReservoirSummary {
        kind,
        units_used,
        dose_count,
        devices_exhausted,
        current_device_fill_pct,
    }
}

/// Account both kinds against their selected devices
pub fn account_all(
    doses: &[InsulinDose],
    window_hours: u32,
    selection: &DeviceSelection,
    now: NaiveDateTime,
) -> ReservoirReport {
    let summary = |kind| account_for(doses, kind, window_hours, selection.device(kind).capacity_units, now);
    ReservoirReport {
        window_hours,
        rapid: summary(InsulinKind::Rapid),
        long: summary(InsulinKind::Long),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceCatalog;
    use crate::insulin::DoseLog;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn log_of(entries: &[(f64, InsulinKind, NaiveDateTime)]) -> DoseLog {
        let mut log = DoseLog::new();
        for &(units, kind, timestamp) in entries {
            log.add(units, kind, timestamp).unwrap();
        }
        log
    }

    #[test]
    fn test_exactly_one_device() {
        let log = log_of(&[(300.0, InsulinKind::Rapid, at(10, 8))]);
        let summary = account_for(log.doses(), InsulinKind::Rapid, 24, 300.0, at(10, 12));
        assert_eq!(summary.devices_exhausted, 1);
        assert_eq!(summary.current_device_fill_pct, 0.0);
        assert_eq!(summary.dose_count, 1);
    }

    #[test]
    fn test_one_and_a_half_devices() {
        let log = log_of(&[(450.0, InsulinKind::Rapid, at(10, 8))]);
        let summary = account_for(log.doses(), InsulinKind::Rapid, 24, 300.0, at(10, 12));
        assert_eq!(summary.units_used, 450.0);
        assert_eq!(summary.devices_exhausted, 1);
        assert_eq!(summary.current_device_fill_pct, 50.0);
    }

    #[test]
    fn test_zero_capacity_is_neutral() {
        let log = log_of(&[(450.0, InsulinKind::Rapid, at(10, 8))]);
        let summary = account_for(log.doses(), InsulinKind::Rapid, 24, 0.0, at(10, 12));
        assert_eq!(summary.units_used, 450.0);
        assert_eq!(summary.devices_exhausted, 0);
        assert_eq!(summary.current_device_fill_pct, 0.0);
        assert!(summary.current_device_fill_pct.is_finite());
    }

    #[test]
    fn test_filters_kind_and_window() {
        let log = log_of(&[
            (10.0, InsulinKind::Rapid, at(10, 8)),
            (20.0, InsulinKind::Long, at(10, 9)),
            (30.0, InsulinKind::Rapid, at(8, 8)), // outside 24h
            (5.0, InsulinKind::Rapid, at(9, 12)), // on the window edge
        ]);
        let summary = account_for(log.doses(), InsulinKind::Rapid, 24, 300.0, at(10, 12));
        assert_eq!(summary.units_used, 15.0);
        assert_eq!(summary.dose_count, 2);
        assert_eq!(summary.current_device_fill_pct, 5.0);
    }

    #[test]
    fn test_empty_log() {
        let summary = account_for(&[], InsulinKind::Long, 720, 300.0, at(10, 12));
        assert_eq!(summary.units_used, 0.0);
        assert_eq!(summary.dose_count, 0);
        assert_eq!(summary.devices_exhausted, 0);
        assert_eq!(summary.current_device_fill_pct, 0.0);
    }

    #[test]
    fn test_account_all_uses_selected_devices() {
        let mut catalog = DeviceCatalog::default();
        catalog.set_custom_capacity(InsulinKind::Rapid, 200.0).unwrap();
        let selection = DeviceSelection::from_catalog(&catalog, "custom-rapid", "toujeo-solostar").unwrap();

        let log = log_of(&[
            (250.0, InsulinKind::Rapid, at(5, 8)),
            (900.0, InsulinKind::Long, at(6, 22)),
        ]);
        let report = account_all(log.doses(), 720, &selection, at(10, 12));
        assert_eq!(report.rapid.devices_exhausted, 1);
        assert_eq!(report.rapid.current_device_fill_pct, 25.0);
        assert_eq!(report.long.devices_exhausted, 2);
        assert_eq!(report.long.current_device_fill_pct, 0.0);
    }
}
