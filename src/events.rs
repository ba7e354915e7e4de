//! High/low and peak/valley detection over an aggregated series

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::synth::GlucoseSample;
use crate::units::{MgDl, Thresholds};

/// An aggregated, classified point of the glucose chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlucosePoint {
    pub timestamp: NaiveDateTime,
    pub value_mg_dl: u16,
    pub is_high: bool,
    pub is_low: bool,
    pub is_peak: bool,
    pub is_valley: bool,
}

impl GlucosePoint {
    /// The most significant event at this point, if any
    ///
    /// Peaks and valleys win over plain highs and lows.
    pub fn event_kind(&self) -> Option<TrendEventKind> {
        if self.is_peak {
            Some(TrendEventKind::Peak)
        } else if self.is_valley {
            Some(TrendEventKind::Valley)
        } else if self.is_high {
            Some(TrendEventKind::High)
        } else if self.is_low {
            Some(TrendEventKind::Low)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendEventKind {
    High,
    Low,
    Peak,
    Valley,
}

impl TrendEventKind {
    pub fn label(self) -> &'static str {
        match self {
            TrendEventKind::High => "High",
            TrendEventKind::Low => "Low",
            TrendEventKind::Peak => "Peak",
            TrendEventKind::Valley => "Valley",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendEvent {
    pub kind: TrendEventKind,
    pub timestamp: NaiveDateTime,
    pub value_mg_dl: u16,
    pub note: String,
}

/// Flag each point of the series
///
/// The first and last points have only one neighbour and are never peaks or
/// valleys.
pub fn classify(series: &[GlucoseSample]) -> Vec<GlucosePoint> {
    let n = series.len();
    series
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let value = sample.value_mg_dl;
            let interior = i > 0 && i + 1 < n;
            let (is_peak, is_valley) = if interior {
                let prev = series[i - 1].value_mg_dl;
                let next = series[i + 1].value_mg_dl;
                (
                    value > prev && value > next && value > Thresholds::PEAK,
                    value < prev && value < next && value < Thresholds::VALLEY,
                )
            } else {
                (false, false)
            };

            GlucosePoint {
                timestamp: sample.timestamp,
                value_mg_dl: value,
                is_high: Thresholds::is_high(value),
                is_low: Thresholds::is_low(value),
                is_peak,
                is_valley,
            }
        })
        .collect()
}

/// One event per flagged point, in series order
pub fn detect_events(points: &[GlucosePoint]) -> Vec<TrendEvent> {
    points
        .iter()
        .filter_map(|point| {
            point.event_kind().map(|kind| TrendEvent {
                kind,
                timestamp: point.timestamp,
                value_mg_dl: point.value_mg_dl,
                note: format!("{} of {}", kind.label(), MgDl(point.value_mg_dl).format()),
            })
        })
        .collect()
}
