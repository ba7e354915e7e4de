//! Application state and the recompute pass
//!
//! Everything the screens can change lives in [`AppState`]. Each recompute
//! throws the previous derived data away and rebuilds it from scratch for
//! the current selections; nothing is cached between passes.

use chrono::NaiveDateTime;
use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::chart::{AxisConfig, ZoomWindow};
use crate::config::Config;
use crate::device::{DeviceCatalog, DeviceSelection};
use crate::error::GlucoTrackError;
use crate::events::{detect_events, GlucosePoint, TrendEvent};
use crate::insulin::{DoseId, DoseLog, InsulinDose, InsulinKind};
use crate::reservoir::{account_all, ReservoirReport};
use crate::stats::{range_analysis, summarize, Band, StatKind, StatTile, SummaryStatistics};
use crate::synth::{bucket_minutes, generate};
use crate::timerange::TimeRange;
use crate::units::GlucoseRange;

/// The latest reading and its status badge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReading {
    pub timestamp: NaiveDateTime,
    pub value_mg_dl: u16,
    pub range: GlucoseRange,
    pub label: &'static str,
    pub band: Band,
}

impl CurrentReading {
    fn from_point(point: &GlucosePoint) -> Self {
        let range = GlucoseRange::of(point.value_mg_dl);
        Self {
            timestamp: point.timestamp,
            value_mg_dl: point.value_mg_dl,
            range,
            label: range.label(),
            band: range.band(),
        }
    }
}

/// Everything one render pass shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub time_range: TimeRange,
    pub insulin_range: TimeRange,
    pub bucket_minutes: u32,
    pub axis: AxisConfig,
    pub current: Option<CurrentReading>,
    pub points: Vec<GlucosePoint>,
    pub events: Vec<TrendEvent>,
    pub statistics: SummaryStatistics,
    pub tiles: Vec<StatTile>,
    pub analysis: Vec<String>,
    pub reservoir: ReservoirReport,
    pub zoom: ZoomWindow,
}

#[derive(Debug, Clone)]
pub struct AppState {
    time_range: TimeRange,
    insulin_range: TimeRange,
    doses: DoseLog,
    catalog: DeviceCatalog,
    selection: DeviceSelection,
    tile_order: Vec<StatKind>,
    zoom: ZoomWindow,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            time_range: TimeRange::TwelveHours,
            insulin_range: TimeRange::OneMonth,
            doses: DoseLog::new(),
            catalog: DeviceCatalog::default(),
            selection: DeviceSelection::default(),
            tile_order: StatKind::ALL.to_vec(),
            zoom: ZoomWindow::default(),
        }
    }
}

impl AppState {
    /// Initial state for the given configuration
    pub fn from_config(config: &Config) -> Result<Self, GlucoTrackError> {
        let mut state = Self::default();
        for kind in InsulinKind::ALL {
            if let Some(capacity) = config.custom_capacity(kind) {
                state.catalog.set_custom_capacity(kind, capacity)?;
            }
        }
        state.selection = DeviceSelection::from_catalog(&state.catalog, &config.rapid_device, &config.long_device)?;
        state.select_time_range(config.time_range)?;
        state.select_insulin_range(config.insulin_range);
        Ok(state)
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn insulin_range(&self) -> TimeRange {
        self.insulin_range
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &DeviceSelection {
        &self.selection
    }

    pub fn tile_order(&self) -> &[StatKind] {
        &self.tile_order
    }

    pub fn doses(&self) -> &DoseLog {
        &self.doses
    }

    pub fn zoom(&self) -> ZoomWindow {
        self.zoom
    }

    pub fn add_dose(&mut self, units: f64, kind: InsulinKind, timestamp: NaiveDateTime) -> Result<DoseId, GlucoTrackError> {
        self.doses.add(units, kind, timestamp)
    }

    pub fn remove_dose(&mut self, id: DoseId) -> Result<InsulinDose, GlucoTrackError> {
        self.doses.remove(id)
    }

    /// Zoom the glucose chart in, for a series of `len` points
    pub fn zoom_in(&mut self, len: usize) {
        self.zoom.zoom_in(len);
    }

    pub fn zoom_out(&mut self, len: usize) {
        self.zoom.zoom_out(len);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    /// Switch the glucose chart window; the zoom resets
    pub fn select_time_range(&mut self, range: TimeRange) -> Result<(), GlucoTrackError> {
        if !range.is_glucose_range() {
            return Err(GlucoTrackError::Config(format!("{} is not a glucose chart range", range)));
        }
        self.time_range = range;
        self.zoom.reset();
        Ok(())
    }

    /// Switch the insulin report window; every catalog window is offered
    pub fn select_insulin_range(&mut self, range: TimeRange) {
        self.insulin_range = range;
    }

    pub fn select_device(&mut self, kind: InsulinKind, id: &str) -> Result<(), GlucoTrackError> {
        let (rapid, long) = match kind {
            InsulinKind::Rapid => (id.to_string(), self.selection.long.id.clone()),
            InsulinKind::Long => (self.selection.rapid.id.clone(), id.to_string()),
        };
        self.selection = DeviceSelection::from_catalog(&self.catalog, &rapid, &long)?;
        Ok(())
    }

    /// Set a custom capacity, refreshing the selection if it uses that device
    pub fn set_custom_capacity(&mut self, kind: InsulinKind, capacity_units: f64) -> Result<(), GlucoTrackError> {
        self.catalog.set_custom_capacity(kind, capacity_units)?;
        let selected = self.selection.device(kind).id.clone();
        self.select_device(kind, &selected)
    }

    /// Move a tile to a new position, clamped to the end of the list
    pub fn move_tile(&mut self, from: usize, to: usize) {
        if from >= self.tile_order.len() {
            return;
        }
        let tile = self.tile_order.remove(from);
        let to = to.min(self.tile_order.len());
        self.tile_order.insert(to, tile);
    }

    /// Rebuild every derived view for the current selections
    pub fn recompute<R: Rng + ?Sized>(&self, now: NaiveDateTime, rng: &mut R) -> Dashboard {
        let hours = self.time_range.hours();
        let points = generate(hours, now, rng);
        let events = detect_events(&points);

        let report_doses = self.doses.within(self.insulin_range.hours(), now);
        let statistics = summarize(&points, &report_doses);
        let tiles = statistics.tiles(&self.tile_order);
        let reservoir = account_all(self.doses.doses(), self.insulin_range.hours(), &self.selection, now);

        debug!(
            "Recomputed {} view: {} points, {} events, {} doses in {}",
            self.time_range,
            points.len(),
            events.len(),
            report_doses.len(),
            self.insulin_range
        );

        Dashboard {
            time_range: self.time_range,
            insulin_range: self.insulin_range,
            bucket_minutes: bucket_minutes(hours),
            axis: AxisConfig::for_hours(hours),
            current: points.last().map(CurrentReading::from_point),
            analysis: range_analysis(&points),
            points,
            events,
            statistics,
            tiles,
            reservoir,
            zoom: self.zoom,
        }
    }
}
