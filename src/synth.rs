//! Glucose trace synthesis and time-bucket aggregation
//!
//! The synthesizer is a stand-in data source: a diurnal baseline curve with
//! bounded uniform noise, sampled at a native spacing that depends on the
//! requested window. Whatever replaces it must keep the output contract, an
//! ordered, timestamped integer series clamped to the sensor range.
//!
//! Aggregation groups contiguous samples into fixed-width buckets. Each
//! bucket reports the rounded mean of its members, stamped with the
//! timestamp of the member at index `n / 2` (not the bucket midpoint).

use chrono::{Duration, NaiveDateTime, Timelike};
use log::{debug, warn};
use rand::Rng;
use serde::Serialize;

use crate::events::{classify, GlucosePoint};
use crate::units::Thresholds;

/// Half-width of the uniform noise added to each sample, in mg/dL
const NOISE_MGDL: f64 = 20.0;

/// Baseline outside any of the diurnal windows
const BASELINE_MGDL: f64 = 120.0;

/// A raw high-frequency sample, before aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlucoseSample {
    pub timestamp: NaiveDateTime,
    pub value_mg_dl: u16,
}

impl GlucoseSample {
    pub fn new(timestamp: NaiveDateTime, value_mg_dl: u16) -> Self {
        Self { timestamp, value_mg_dl }
    }
}

/// Native spacing between synthesized samples
pub fn native_interval_minutes(hours: u32) -> u32 {
    if hours > 168 {
        30
    } else if hours > 24 {
        15
    } else {
        5
    }
}

/// Width of an aggregation bucket for a window of `hours`
pub fn bucket_minutes(hours: u32) -> u32 {
    if hours > 168 {
        360
    } else if hours > 72 {
        180
    } else if hours > 24 {
        120
    } else if hours == 24 {
        60
    } else if hours > 12 {
        30
    } else if hours > 4 {
        15
    } else {
        5
    }
}

/// Expected glucose for an hour of the day, before noise
pub fn baseline(hour_of_day: u32) -> f64 {
    let offset = match hour_of_day {
        6..=7 => 40.0,   // dawn phenomenon
        11..=13 => 30.0, // after lunch
        18..=20 => 25.0, // after dinner
        0..=3 => -20.0,  // overnight
        _ => 0.0,
    };
    BASELINE_MGDL + offset
}

/// Synthesize raw samples covering `[now - hours, now)`
///
/// Returns an empty series for `hours == 0`, and for windows reaching past
/// the representable calendar.
pub fn synthesize<R: Rng + ?Sized>(hours: u32, now: NaiveDateTime, rng: &mut R) -> Vec<GlucoseSample> {
    let step = native_interval_minutes(hours);
    let count = hours.saturating_mul(60) / step;
    let Some(start) = now.checked_sub_signed(Duration::hours(i64::from(hours))) else {
        warn!("{}h window before {} is out of calendar range", hours, now);
        return Vec::new();
    };

    let samples: Vec<GlucoseSample> = (0..count)
        .map(|i| {
            let timestamp = start + Duration::minutes(i64::from(i * step));
            let noise = rng.gen_range(-NOISE_MGDL..NOISE_MGDL);
            let value = (baseline(timestamp.hour()) + noise)
                .clamp(f64::from(Thresholds::SENSOR_MIN), f64::from(Thresholds::SENSOR_MAX))
                .round() as u16;
            GlucoseSample::new(timestamp, value)
        })
        .collect();

    debug!("Synthesized {} samples for {}h at {} min spacing", samples.len(), hours, step);
    samples
}

/// Average contiguous samples into buckets `width_minutes` wide
///
/// A bucket opens at its first member and takes every following sample less
/// than `width_minutes` after it. The trailing bucket is emitted even when it
/// is short.
pub fn bucket(samples: &[GlucoseSample], width_minutes: u32) -> Vec<GlucoseSample> {
    let width = Duration::minutes(i64::from(width_minutes));
    let mut buckets = Vec::new();
    let mut group_start = 0;

    for (i, sample) in samples.iter().enumerate() {
        if sample.timestamp - samples[group_start].timestamp >= width {
            buckets.push(collapse(&samples[group_start..i]));
            group_start = i;
        }
    }
    if group_start < samples.len() {
        buckets.push(collapse(&samples[group_start..]));
    }

    buckets
}

/// Collapse a non-empty group into its mean value at the median-indexed timestamp
fn collapse(group: &[GlucoseSample]) -> GlucoseSample {
    let sum: u32 = group.iter().map(|s| u32::from(s.value_mg_dl)).sum();
    let mean = (f64::from(sum) / group.len() as f64).round() as u16;
    GlucoseSample::new(group[group.len() / 2].timestamp, mean)
}

/// Bucket the samples for a window of `hours` and classify the result
pub fn aggregate(samples: &[GlucoseSample], hours: u32) -> Vec<GlucosePoint> {
    let width = bucket_minutes(hours);
    let buckets = bucket(samples, width);
    debug!("Aggregated {} samples into {} buckets of {} min", samples.len(), buckets.len(), width);
    classify(&buckets)
}

/// Synthesize, aggregate and classify in one step
pub fn generate<R: Rng + ?Sized>(hours: u32, now: NaiveDateTime, rng: &mut R) -> Vec<GlucosePoint> {
    aggregate(&synthesize(hours, now, rng), hours)
}
