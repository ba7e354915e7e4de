//! glucotrack command-line front end
//!
//! Prints the dashboard the screens would render, as JSON.
//!
//! Usage:
//!   glucotrack                          - Report for the configured range
//!   glucotrack report 24h               - Report for a given range
//!   glucotrack reservoir 450 300        - Account one dose against a pen
//!   glucotrack --help                   - Show help
//!   GLUCOTRACK_DBG=1 glucotrack report  - Enable debug output

use std::env;

use chrono::Local;
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use glucotrack::config::{config_file_path, ensure_data_dir, get_data_dir, Config};
use glucotrack::device::DeviceCatalog;
use glucotrack::insulin::{parse_units, DoseLog, InsulinKind};
use glucotrack::reservoir::account_for;
use glucotrack::timerange::TimeRange;
use glucotrack::units::Thresholds;
use glucotrack::{AppState, GlucoTrackError};

fn main() -> Result<(), GlucoTrackError> {
    let args: Vec<String> = env::args().collect();

    // Check for debug mode
    let debug_mode = env::var("GLUCOTRACK_DBG").is_ok();

    if debug_mode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    }

    // Create default config if it doesn't exist
    let cfg_path = config_file_path();
    if !cfg_path.exists() {
        if let Err(e) = ensure_data_dir().and_then(|_| Config::create_default(&cfg_path)) {
            if debug_mode {
                warn!("Could not create default config: {}", e);
            }
        }
    }

    // Try loading config from data directory first, then current directory
    let config = Config::load(&cfg_path)
        .or_else(|_| Config::load("config.txt"))
        .unwrap_or_else(|e| {
            if debug_mode {
                warn!("Could not load config: {}. Using defaults.", e);
            }
            Config::default()
        });

    run(&args, &config)
}

/// Dispatch one command line; unknown commands are an error
fn run(args: &[String], config: &Config) -> Result<(), GlucoTrackError> {
    match args.get(1).map(|s| s.as_str()) {
        None | Some("report") => cmd_report(config, args.get(2))?,
        Some("ranges") => print_json(&TimeRange::ALL.map(TimeRange::spec))?,
        Some("devices") => print_json(&DeviceCatalog::default().devices())?,
        Some("reservoir") => cmd_reservoir(args.get(2), args.get(3), args.get(4))?,
        Some("path") | Some("paths") => cmd_show_paths(),
        Some("--version") | Some("-V") => {
            println!("glucotrack {}", env!("CARGO_PKG_VERSION"));
        }
        Some("--help") | Some("-h") | Some("help") => print_help(),
        Some(other) => {
            print_help();
            return Err(GlucoTrackError::UnknownCommand(other.to_string()));
        }
    }

    Ok(())
}

/// Synthesize and summarize one time window
fn cmd_report(config: &Config, range: Option<&String>) -> Result<(), GlucoTrackError> {
    let mut state = AppState::from_config(config)?;
    if let Some(token) = range {
        state.select_time_range(token.parse()?)?;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let dashboard = state.recompute(Local::now().naive_local(), &mut rng);
    print_json(&dashboard)
}

/// Account a single dose against a device capacity
fn cmd_reservoir(
    units: Option<&String>,
    capacity: Option<&String>,
    kind: Option<&String>,
) -> Result<(), GlucoTrackError> {
    let units = parse_units(units.map(String::as_str).unwrap_or(""))?;
    let capacity = parse_units(capacity.map(String::as_str).unwrap_or("300"))?;
    let kind: InsulinKind = kind.map(String::as_str).unwrap_or("rapid").parse()?;

    let now = Local::now().naive_local();
    let mut log = DoseLog::new();
    log.add(units, kind, now)?;

    let summary = account_for(log.doses(), kind, TimeRange::OneDay.hours(), capacity, now);
    print_json(&summary)
}

/// Show data paths
fn cmd_show_paths() {
    println!("glucotrack paths:");
    println!("  Data directory:  {}", get_data_dir().display());
    println!("  Config file:     {}", config_file_path().display());
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), GlucoTrackError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_help() {
    eprintln!("glucotrack v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  glucotrack [report [range]]             Dashboard JSON (2h, 12h, 24h, 7d, 14d)");
    eprintln!("  glucotrack ranges                       List time windows");
    eprintln!("  glucotrack devices                      List delivery devices");
    eprintln!("  glucotrack reservoir <units> [capacity] [rapid|long]");
    eprintln!("                                          Account one dose against a pen");
    eprintln!("  glucotrack path                         Show data file locations");
    eprintln!("  glucotrack help                         Show this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("  GLUCOTRACK_DBG=1                        Enable debug output");
    eprintln!();
    eprintln!("TARGET RANGE:");
    eprintln!("  {}", Thresholds::format_range());
    eprintln!();
    eprintln!("CONFIG:");
    eprintln!("  {}", config_file_path().display());
}
