//! Summary statistics for a glucose series and insulin log
//!
//! Every figure here ends up on screen, so degenerate input (no readings,
//! zero mean) yields zeros rather than NaN or infinity.

use serde::Serialize;

use crate::events::GlucosePoint;
use crate::insulin::{InsulinDose, InsulinKind};
use crate::units::{MgDl, Thresholds};

/// Offset of the NGSP mean-glucose to A1c conversion
const A1C_INTERCEPT: f64 = 46.7;
/// Slope of the NGSP mean-glucose to A1c conversion
const A1C_SLOPE: f64 = 28.7;

/// Insulin units administered, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InsulinTotals {
    pub rapid: f64,
    pub long: f64,
}

impl InsulinTotals {
    /// Sum every dose in the slice; callers pre-filter to the report window
    pub fn from_doses(doses: &[InsulinDose]) -> Self {
        doses.iter().fold(Self::default(), |mut totals, dose| {
            match dose.kind {
                InsulinKind::Rapid => totals.rapid += dose.units,
                InsulinKind::Long => totals.long += dose.units,
            }
            totals
        })
    }

    pub fn get(&self, kind: InsulinKind) -> f64 {
        match kind {
            InsulinKind::Rapid => self.rapid,
            InsulinKind::Long => self.long,
        }
    }

    pub fn total(&self) -> f64 {
        self.rapid + self.long
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub mean_mg_dl: u16,
    pub pct_in_range: u32,
    pub pct_high: u32,
    pub pct_low: u32,
    pub event_count: usize,
    pub std_dev_mg_dl: u32,
    pub coefficient_of_variation_pct: u32,
    pub estimated_a1c_pct: f64,
    pub total_insulin_units: InsulinTotals,
}

/// Summarize a classified series together with a (pre-filtered) dose log
///
/// High and low are recounted from the values rather than read from the
/// point flags; both use [`Thresholds`], so they agree.
pub fn summarize(points: &[GlucosePoint], doses: &[InsulinDose]) -> SummaryStatistics {
    let total_insulin_units = InsulinTotals::from_doses(doses);

    let values: Vec<f64> = points
        .iter()
        .map(|p| p.value_mg_dl)
        .filter(|&v| v > 0)
        .map(f64::from)
        .collect();

    if values.is_empty() {
        return SummaryStatistics {
            total_insulin_units,
            ..Default::default()
        };
    }

    let n = values.len() as f64;
    let raw_mean = values.iter().sum::<f64>() / n;
    let mean = raw_mean.round();

    let high = values.iter().filter(|&&v| v > f64::from(Thresholds::HIGH)).count();
    let low = values.iter().filter(|&&v| v < f64::from(Thresholds::LOW)).count();
    let in_range = values.len() - high - low;
    let pct = |count: usize| (count as f64 / n * 100.0).round() as u32;

    let std_dev = population_std_dev(&values, raw_mean).round();
    let coefficient_of_variation_pct = if mean > 0.0 {
        (100.0 * std_dev / mean).round() as u32
    } else {
        0
    };

    SummaryStatistics {
        mean_mg_dl: mean as u16,
        pct_in_range: pct(in_range),
        pct_high: pct(high),
        pct_low: pct(low),
        event_count: high + low,
        std_dev_mg_dl: std_dev as u32,
        coefficient_of_variation_pct,
        estimated_a1c_pct: estimated_a1c(mean),
        total_insulin_units,
    }
}

/// Estimated A1c (%) from a mean glucose, rounded to one decimal
pub fn estimated_a1c(mean_mg_dl: f64) -> f64 {
    if mean_mg_dl <= 0.0 {
        return 0.0;
    }
    round1((mean_mg_dl + A1C_INTERCEPT) / A1C_SLOPE)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Population (not sample) standard deviation
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Short textual analysis shown next to the chart
pub fn range_analysis(points: &[GlucosePoint]) -> Vec<String> {
    if points.is_empty() {
        return Vec::new();
    }
    let stats = summarize(points, &[]);
    vec![
        format!("Average glucose: {}", MgDl(stats.mean_mg_dl).format()),
        format!("Time in range: {}%", stats.pct_in_range),
    ]
}

// ============= Stat tiles =============

/// Colour band of a tile or badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Success,
    Warning,
    Error,
    Neutral,
}

/// The statistics that can be shown as a dashboard tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Average,
    InRange,
    Events,
    StdDev,
    Cv,
    EA1c,
    TotalInsulin,
}

impl StatKind {
    pub const ALL: [StatKind; 7] = [
        StatKind::Average,
        StatKind::InRange,
        StatKind::Events,
        StatKind::StdDev,
        StatKind::Cv,
        StatKind::EA1c,
        StatKind::TotalInsulin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Average => "Average",
            StatKind::InRange => "Time in range",
            StatKind::Events => "Events",
            StatKind::StdDev => "Std. deviation",
            StatKind::Cv => "Coefficient of variation",
            StatKind::EA1c => "Estimated A1c",
            StatKind::TotalInsulin => "Total insulin",
        }
    }

    pub fn band(self, value: f64) -> Band {
        match self {
            StatKind::Average => {
                if value <= f64::from(Thresholds::LOW) {
                    Band::Error
                } else if value <= f64::from(Thresholds::HIGH) {
                    Band::Success
                } else {
                    Band::Warning
                }
            }
            StatKind::InRange => {
                if value >= 80.0 {
                    Band::Success
                } else if value >= 60.0 {
                    Band::Warning
                } else {
                    Band::Error
                }
            }
            StatKind::Events => lower_is_better(value, 2.0, 5.0),
            StatKind::StdDev => lower_is_better(value, 50.0, 60.0),
            StatKind::Cv => lower_is_better(value, 36.0, 40.0),
            StatKind::EA1c => {
                if value < 7.0 {
                    Band::Success
                } else if value < 8.0 {
                    Band::Warning
                } else {
                    Band::Error
                }
            }
            StatKind::TotalInsulin => Band::Neutral,
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            StatKind::Average | StatKind::StdDev => format!("{:.0} {}", value, MgDl::unit_label()),
            StatKind::InRange | StatKind::Cv => format!("{:.0}%", value),
            StatKind::Events => format!("{:.0}", value),
            StatKind::EA1c => format!("{:.1}%", value),
            StatKind::TotalInsulin => format!("{:.1} U", value),
        }
    }

    pub fn value_of(self, stats: &SummaryStatistics) -> f64 {
        match self {
            StatKind::Average => f64::from(stats.mean_mg_dl),
            StatKind::InRange => f64::from(stats.pct_in_range),
            StatKind::Events => stats.event_count as f64,
            StatKind::StdDev => f64::from(stats.std_dev_mg_dl),
            StatKind::Cv => f64::from(stats.coefficient_of_variation_pct),
            StatKind::EA1c => stats.estimated_a1c_pct,
            StatKind::TotalInsulin => stats.total_insulin_units.total(),
        }
    }
}

fn lower_is_better(value: f64, good: f64, fair: f64) -> Band {
    if value <= good {
        Band::Success
    } else if value <= fair {
        Band::Warning
    } else {
        Band::Error
    }
}

/// A rendered dashboard tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatTile {
    pub kind: StatKind,
    pub label: &'static str,
    pub value: f64,
    pub display: String,
    pub band: Band,
}

impl SummaryStatistics {
    /// Tiles in the given order
    pub fn tiles(&self, order: &[StatKind]) -> Vec<StatTile> {
        order
            .iter()
            .map(|&kind| {
                let value = kind.value_of(self);
                StatTile {
                    kind,
                    label: kind.label(),
                    value,
                    display: kind.format(value),
                    band: kind.band(value),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::classify;
    use crate::insulin::DoseLog;
    use crate::synth::GlucoseSample;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn points(values: &[u16]) -> Vec<GlucosePoint> {
        let samples: Vec<GlucoseSample> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| GlucoseSample::new(start() + Duration::hours(i as i64), v))
            .collect();
        classify(&samples)
    }

    #[test]
    fn test_empty_is_all_zero() {
        let stats = summarize(&[], &[]);
        assert_eq!(stats, SummaryStatistics::default());
        assert_eq!(stats.estimated_a1c_pct, 0.0);
        assert!(range_analysis(&[]).is_empty());
    }

    #[test]
    fn test_zero_values_are_dropped() {
        let stats = summarize(&points(&[0, 0]), &[]);
        assert_eq!(stats, SummaryStatistics::default());

        let stats = summarize(&points(&[0, 100, 120]), &[]);
        assert_eq!(stats.mean_mg_dl, 110);
        assert_eq!(stats.pct_in_range, 100);
    }

    #[test]
    fn test_flat_series() {
        let stats = summarize(&points(&[100, 100, 100, 100]), &[]);
        assert_eq!(stats.mean_mg_dl, 100);
        assert_eq!(stats.std_dev_mg_dl, 0);
        assert_eq!(stats.coefficient_of_variation_pct, 0);
        assert_eq!(stats.estimated_a1c_pct, 5.1);
        assert_eq!(stats.pct_in_range, 100);
        assert_eq!(stats.event_count, 0);
    }

    #[test]
    fn test_percentages_round_independently() {
        let stats = summarize(&points(&[60, 190, 100]), &[]);
        assert_eq!(stats.pct_low, 33);
        assert_eq!(stats.pct_high, 33);
        assert_eq!(stats.pct_in_range, 33);
        assert_eq!(stats.event_count, 2);
        // each share rounds on its own, so the sum may be off by one
        let sum = stats.pct_low + stats.pct_high + stats.pct_in_range;
        assert!((99..=101).contains(&sum));
    }

    #[test]
    fn test_population_std_dev_and_cv() {
        // mean 150, deviations +-50 -> population sd 50
        let stats = summarize(&points(&[100, 200, 100, 200]), &[]);
        assert_eq!(stats.mean_mg_dl, 150);
        assert_eq!(stats.std_dev_mg_dl, 50);
        assert_eq!(stats.coefficient_of_variation_pct, 33);
        assert_eq!(stats.pct_high, 50);
        // (150 + 46.7) / 28.7 = 6.85...
        assert_eq!(stats.estimated_a1c_pct, 6.9);
    }

    #[test]
    fn test_a1c_uses_rounded_mean() {
        // raw mean 154.5 rounds to 155
        let stats = summarize(&points(&[154, 155]), &[]);
        assert_eq!(stats.mean_mg_dl, 155);
        assert_eq!(stats.estimated_a1c_pct, estimated_a1c(155.0));
        assert_eq!(estimated_a1c(0.0), 0.0);
    }

    #[test]
    fn test_insulin_totals_by_kind() {
        let mut log = DoseLog::new();
        log.add(4.0, InsulinKind::Rapid, start()).unwrap();
        log.add(6.5, InsulinKind::Rapid, start()).unwrap();
        log.add(20.0, InsulinKind::Long, start()).unwrap();

        let stats = summarize(&[], log.doses());
        assert_eq!(stats.mean_mg_dl, 0);
        assert_eq!(stats.total_insulin_units.rapid, 10.5);
        assert_eq!(stats.total_insulin_units.get(InsulinKind::Long), 20.0);
        assert_eq!(stats.total_insulin_units.total(), 30.5);
    }

    #[test]
    fn test_range_analysis_lines() {
        let lines = range_analysis(&points(&[60, 190, 100]));
        assert_eq!(lines, vec!["Average glucose: 117 mg/dL", "Time in range: 33%"]);
    }

    #[test]
    fn test_bands() {
        assert_eq!(StatKind::Average.band(70.0), Band::Error);
        assert_eq!(StatKind::Average.band(150.0), Band::Success);
        assert_eq!(StatKind::Average.band(181.0), Band::Warning);
        assert_eq!(StatKind::InRange.band(80.0), Band::Success);
        assert_eq!(StatKind::InRange.band(60.0), Band::Warning);
        assert_eq!(StatKind::InRange.band(59.0), Band::Error);
        assert_eq!(StatKind::Events.band(2.0), Band::Success);
        assert_eq!(StatKind::Events.band(5.0), Band::Warning);
        assert_eq!(StatKind::Events.band(6.0), Band::Error);
        assert_eq!(StatKind::Cv.band(36.0), Band::Success);
        assert_eq!(StatKind::Cv.band(41.0), Band::Error);
        assert_eq!(StatKind::EA1c.band(6.9), Band::Success);
        assert_eq!(StatKind::EA1c.band(7.5), Band::Warning);
        assert_eq!(StatKind::TotalInsulin.band(1000.0), Band::Neutral);
    }

    #[test]
    fn test_tiles() {
        let stats = summarize(&points(&[100, 100, 100, 100]), &[]);
        let tiles = stats.tiles(&[StatKind::EA1c, StatKind::Average]);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].display, "5.1%");
        assert_eq!(tiles[1].display, "100 mg/dL");
        assert_eq!(tiles[1].band, Band::Success);
        assert_eq!(stats.tiles(&StatKind::ALL).len(), 7);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn summary_is_finite_and_partitions(values in prop::collection::vec(40u16..=300, 1..200)) {
                let stats = summarize(&points(&values), &[]);
                prop_assert!(stats.estimated_a1c_pct.is_finite());
                prop_assert!(stats.mean_mg_dl >= 40 && stats.mean_mg_dl <= 300);
                let sum = stats.pct_low + stats.pct_high + stats.pct_in_range;
                prop_assert!((99..=101).contains(&sum), "sum {}", sum);
                let flagged = points(&values).iter().filter(|p| p.is_high || p.is_low).count();
                prop_assert_eq!(stats.event_count, flagged);
            }
        }
    }
}
