use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Units;

#[derive(Parser)]
#[command(name = "heat-atlas")]
#[command(about = "NOAA CDO heat-stress acquisition and aggregation pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file (TOML)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select stations and fetch their daily TMAX/TMIN series to CSV
    Fetch {
        #[arg(
            short,
            long,
            help = "Output CSV path",
            default_value = "data/noaa_daily.csv"
        )]
        out: PathBuf,

        #[arg(long, help = "Start date (overrides configuration)")]
        start: Option<NaiveDate>,

        #[arg(long, help = "End date (overrides configuration)")]
        end: Option<NaiveDate>,

        #[arg(long, help = "Number of stations to select")]
        station_count: Option<usize>,

        #[arg(long, value_enum, help = "Unit system requested from the API")]
        units: Option<Units>,

        #[arg(long, help = "Retry attempts for transient API failures")]
        retries: Option<u32>,

        #[arg(long, help = "Per-request timeout in seconds")]
        timeout: Option<u64>,

        #[arg(long, help = "Delay between requests in seconds")]
        sleep: Option<f64>,

        #[arg(long, default_value = "false", help = "List selected stations only")]
        dry_run: bool,
    },

    /// Aggregate a daily CSV into yearly heat metrics GeoJSON
    Aggregate {
        #[arg(short, long, help = "Input daily CSV")]
        input: PathBuf,

        #[arg(short, long, help = "Output GeoJSON path")]
        output: PathBuf,

        #[arg(long, help = "Minimum valid days for a year to qualify")]
        min_days: Option<usize>,
    },

    /// Report early vs late period means from a metrics GeoJSON
    Summarize {
        #[arg(short, long, help = "Input metrics GeoJSON")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output CSV path (prints to stdout when omitted)"
        )]
        output: Option<PathBuf>,

        #[arg(long, default_value = "1961")]
        early_start: i32,

        #[arg(long, default_value = "1980")]
        early_end: i32,

        #[arg(long, default_value = "2006")]
        late_start: i32,

        #[arg(long, default_value = "2025")]
        late_end: i32,
    },
}
