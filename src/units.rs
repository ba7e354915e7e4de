//! Glucose unit type and clinical thresholds
//!
//! All glucose values in this crate are integer mg/dL. The thresholds are
//! fixed clinical constants and are deliberately not configurable: the event
//! detector and the statistics aggregator classify against the same numbers,
//! so they agree by construction.

use serde::{Deserialize, Serialize};

use crate::stats::Band;

/// Glucose value in mg/dL (milligrams per deciliter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MgDl(pub u16);

impl MgDl {
    /// Format the value with unit suffix
    pub fn format(self) -> String {
        format!("{} mg/dL", self.0)
    }

    /// Get the unit label
    pub fn unit_label() -> &'static str {
        "mg/dL"
    }
}

/// Clinical threshold constants in mg/dL
pub struct Thresholds;

impl Thresholds {
    /// Readings strictly below this are low
    pub const LOW: u16 = 70;
    /// Readings strictly above this are high
    pub const HIGH: u16 = 180;
    /// A local maximum only counts as a peak above this
    pub const PEAK: u16 = 160;
    /// A local minimum only counts as a valley below this
    pub const VALLEY: u16 = 90;

    /// Lower clamp of any synthesized reading
    pub const SENSOR_MIN: u16 = 40;
    /// Upper clamp of any synthesized reading
    pub const SENSOR_MAX: u16 = 300;

    pub fn is_high(mg_dl: u16) -> bool {
        mg_dl > Self::HIGH
    }

    pub fn is_low(mg_dl: u16) -> bool {
        mg_dl < Self::LOW
    }

    /// Get threshold display string
    pub fn format_range() -> String {
        format!("{}-{} {}", Self::LOW, Self::HIGH, MgDl::unit_label())
    }
}

/// Classification of a single glucose value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseRange {
    Low,     // < 70 mg/dL
    InRange, // 70 to 180 inclusive
    High,    // > 180 mg/dL
}

impl GlucoseRange {
    pub fn of(mg_dl: u16) -> Self {
        if Thresholds::is_high(mg_dl) {
            GlucoseRange::High
        } else if Thresholds::is_low(mg_dl) {
            GlucoseRange::Low
        } else {
            GlucoseRange::InRange
        }
    }

    /// Get a display label for the range
    pub fn label(self) -> &'static str {
        match self {
            GlucoseRange::Low => "Low",
            GlucoseRange::InRange => "In Range",
            GlucoseRange::High => "High",
        }
    }

    /// Colour band of the current-reading badge
    pub fn band(self) -> Band {
        match self {
            GlucoseRange::Low => Band::Warning,
            GlucoseRange::InRange => Band::Success,
            GlucoseRange::High => Band::Error,
        }
    }
}
