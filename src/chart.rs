//! Chart view helpers: zoom over point indices and axis labelling

use chrono::NaiveDateTime;
use serde::Serialize;

/// Narrowest span a zoom-in may produce, in points
const MIN_ZOOM_SPAN: usize = 10;

/// Visible index range of the chart, `None` when fully zoomed out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoomWindow {
    domain: Option<(usize, usize)>,
}

impl ZoomWindow {
    pub fn domain(&self) -> Option<(usize, usize)> {
        self.domain
    }

    pub fn is_zoomed(&self) -> bool {
        self.domain.is_some()
    }

    /// Zoom in around the centre of the current view of a `len`-point series
    ///
    /// A domain left over from a longer series restarts from the full view.
    pub fn zoom_in(&mut self, len: usize) {
        if len == 0 {
            self.domain = None;
            return;
        }
        let last = len - 1;
        self.domain = Some(match self.current(len) {
            None => (len / 4, (len * 3 / 4).min(last)),
            Some((start, end)) => {
                let mid = ((start + end) / 2).min(last);
                let span = ((end - start) / 2).max(MIN_ZOOM_SPAN);
                (mid.saturating_sub(span / 2), (mid + span / 2).min(last))
            }
        });
    }

    /// Zoom out, falling back to the full view once nearly everything shows
    pub fn zoom_out(&mut self, len: usize) {
        let Some((start, end)) = self.current(len) else {
            self.domain = None;
            return;
        };
        let mid = (start + end) / 2;
        let span = end.saturating_sub(start).saturating_mul(2).min(len);
        let new_start = mid.saturating_sub(span / 2);
        let new_end = (mid + span / 2).min(len - 1);

        self.domain = if new_end.saturating_sub(new_start) >= len.saturating_sub(2) {
            None
        } else {
            Some((new_start, new_end))
        };
    }

    /// The stored domain, if it is well-formed for a `len`-point series
    fn current(&self, len: usize) -> Option<(usize, usize)> {
        self.domain.filter(|&(start, end)| start <= end && end < len)
    }

    pub fn reset(&mut self) {
        self.domain = None;
    }

    /// The points inside the window
    pub fn visible<'a, T>(&self, points: &'a [T]) -> &'a [T] {
        match self.domain {
            Some((start, end)) if start <= end && start < points.len() => {
                &points[start..=end.min(points.len() - 1)]
            }
            Some(_) => &[],
            None => points,
        }
    }
}

/// X-axis labelling for a time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisConfig {
    pub tick_count: usize,
    pub angle_labels: bool,
    pub label_format: &'static str,
}

impl AxisConfig {
    pub fn for_hours(hours: u32) -> Self {
        let tick_count = if hours > 168 {
            7
        } else if hours > 72 {
            8
        } else if hours == 24 {
            6
        } else if hours > 12 {
            8
        } else if hours > 4 {
            6
        } else {
            5
        };

        let label_format = if hours > 168 {
            "%d/%m"
        } else if hours > 24 {
            "%d/%m %H:%M"
        } else {
            "%H:%M"
        };

        Self {
            tick_count,
            angle_labels: hours > 24,
            label_format,
        }
    }

    pub fn format_time(&self, timestamp: NaiveDateTime) -> String {
        timestamp.format(self.label_format).to_string()
    }

    /// Format a serialized timestamp, passing unparseable input through
    pub fn format_tick(&self, raw: &str) -> String {
        match raw.parse::<NaiveDateTime>() {
            Ok(timestamp) => self.format_time(timestamp),
            Err(_) => raw.to_string(),
        }
    }
}
