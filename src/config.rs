//! Configuration file parsing

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::GlucoTrackError;
use crate::insulin::{parse_units, InsulinKind};
use crate::timerange::TimeRange;

const DEFAULT_CONFIG: &str = "\
# glucotrack configuration
# Lines are `key value`; anything after # is a comment.

time_range 12h          # 2h, 12h, 24h, 7d or 14d
insulin_range 30d       # any of the above, or 30d, 90d, 180d, 365d
rapid_device novorapid-flexpen
long_device lantus-solostar
# custom_rapid_capacity 300
# custom_long_capacity 300
# seed 42               # fixed seed for the synthesized trace
";

/// Configuration loaded from config.txt
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub time_range: TimeRange,
    pub insulin_range: TimeRange,
    pub rapid_device: String,
    pub long_device: String,
    pub custom_rapid_capacity: Option<f64>,
    pub custom_long_capacity: Option<f64>,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_range: TimeRange::TwelveHours,
            insulin_range: TimeRange::OneMonth,
            rapid_device: "novorapid-flexpen".to_string(),
            long_device: "lantus-solostar".to_string(),
            custom_rapid_capacity: None,
            custom_long_capacity: None,
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GlucoTrackError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse configuration lines from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, GlucoTrackError> {
        let mut config = Config::default();

        for line in reader.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, rest)) = Self::parse_line(line) {
                // Extract value before any comment
                let value = rest.split('#').next().unwrap_or("").trim();
                config.apply(key, value)?;
            }
        }

        Ok(config)
    }

    /// Parse a single config line, returning (key, value)
    fn parse_line(line: &str) -> Option<(&str, &str)> {
        // Find first whitespace to separate key from value
        let mut parts = line.splitn(2, |c: char| c.is_whitespace());
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();

        if key.is_empty() || value.is_empty() {
            return None;
        }

        Some((key, value))
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), GlucoTrackError> {
        match key {
            "time_range" => {
                let range: TimeRange = value.parse()?;
                if !range.is_glucose_range() {
                    return Err(GlucoTrackError::Config(format!("{} is not a glucose chart range", range)));
                }
                self.time_range = range;
            }
            "insulin_range" => self.insulin_range = value.parse()?,
            "rapid_device" => self.rapid_device = value.to_string(),
            "long_device" => self.long_device = value.to_string(),
            "custom_rapid_capacity" => self.custom_rapid_capacity = Some(parse_units(value)?),
            "custom_long_capacity" => self.custom_long_capacity = Some(parse_units(value)?),
            "seed" => {
                let seed = value
                    .parse()
                    .map_err(|_| GlucoTrackError::Config(format!("invalid seed '{}'", value)))?;
                self.seed = Some(seed);
            }
            other => warn!("Ignoring unknown config key '{}'", other),
        }
        Ok(())
    }

    /// Custom capacity configured for `kind`, if any
    pub fn custom_capacity(&self, kind: InsulinKind) -> Option<f64> {
        match kind {
            InsulinKind::Rapid => self.custom_rapid_capacity,
            InsulinKind::Long => self.custom_long_capacity,
        }
    }

    /// Write the commented default configuration
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<(), GlucoTrackError> {
        fs::write(path, DEFAULT_CONFIG)?;
        Ok(())
    }
}

/// OS-specific data directory for glucotrack
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glucotrack")
}

pub fn ensure_data_dir() -> Result<PathBuf, GlucoTrackError> {
    let dir = get_data_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_file_path() -> PathBuf {
    get_data_dir().join("config.txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config = Config::from_reader(Cursor::new(DEFAULT_CONFIG)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_values_and_comments() {
        let text = "\
            time_range 7d   # a week\n\
            insulin_range 90d\n\
            \n\
            # comment line\n\
            long_device custom-long\n\
            custom_long_capacity 250\n\
            seed 1234\n\
            colour blue\n";
        let config = Config::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(config.time_range, TimeRange::OneWeek);
        let short = Config::from_reader(Cursor::new("insulin_range 14d")).unwrap();
        assert_eq!(short.insulin_range, TimeRange::TwoWeeks);
        assert_eq!(config.insulin_range, TimeRange::ThreeMonths);
        assert_eq!(config.long_device, "custom-long");
        assert_eq!(config.custom_capacity(InsulinKind::Long), Some(250.0));
        assert_eq!(config.custom_capacity(InsulinKind::Rapid), None);
        assert_eq!(config.seed, Some(1234));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_reader(Cursor::new("time_range 365d")),
            Err(GlucoTrackError::Config(_))
        ));
        assert!(matches!(
            Config::from_reader(Cursor::new("insulin_range 2w")),
            Err(GlucoTrackError::UnknownTimeRange(_))
        ));
        assert!(matches!(
            Config::from_reader(Cursor::new("time_range 5h")),
            Err(GlucoTrackError::UnknownTimeRange(_))
        ));
        assert!(matches!(
            Config::from_reader(Cursor::new("custom_rapid_capacity -3")),
            Err(GlucoTrackError::InvalidUnits(_))
        ));
        assert!(matches!(
            Config::from_reader(Cursor::new("seed many")),
            Err(GlucoTrackError::Config(_))
        ));
    }

    #[test]
    fn test_key_without_value_is_skipped() {
        let config = Config::from_reader(Cursor::new("seed\n")).unwrap();
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_config_path_is_in_data_dir() {
        assert!(config_file_path().starts_with(get_data_dir()));
        assert!(config_file_path().ends_with("config.txt"));
    }
}
