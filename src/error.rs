//! Error types for the glucose tracking pipeline

use thiserror::Error;

use crate::insulin::DoseId;

#[derive(Error, Debug)]
pub enum GlucoTrackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown time range: {0}")]
    UnknownTimeRange(String),

    #[error("Unknown delivery device: {0}")]
    UnknownDevice(String),

    #[error("Invalid insulin units: {0}")]
    InvalidUnits(String),

    #[error("No dose with id {0}")]
    DoseNotFound(DoseId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
