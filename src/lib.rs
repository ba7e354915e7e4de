//! Glucose trace synthesis, event detection and summary statistics
//!
//! The pipeline behind the glucose monitoring and insulin screens:
//!
//! 1. [`synth`] synthesizes a raw trace for a time window and buckets it
//! 2. [`events`] flags highs, lows, peaks and valleys
//! 3. [`stats`] derives the summary figures and dashboard tiles
//! 4. [`reservoir`] accounts insulin doses against pen capacities
//!
//! [`state::AppState`] ties them together for one recompute pass.

pub mod chart;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod insulin;
pub mod reservoir;
pub mod state;
pub mod stats;
pub mod synth;
pub mod timerange;
pub mod units;

pub use error::GlucoTrackError;
pub use state::{AppState, Dashboard};
pub use timerange::TimeRange;
