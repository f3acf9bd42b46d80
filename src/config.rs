use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::analyzers::heat_analyzer::{HeatThresholds, StationOverrides};
use crate::error::{PipelineError, Result};
use crate::utils::constants::{
    DEFAULT_RETRIES, DEFAULT_SLEEP_SECS, DEFAULT_TIMEOUT_SECS, HOT_DAY_C, MIN_DAYS_PER_YEAR,
    VERY_HOT_DAY_C, WARM_NIGHT_C,
};

/// Unit system requested from the API. Standard responses are Fahrenheit;
/// metric responses are converted to Fahrenheit before reaching the CSV, so
/// the acquisition artifact is always degrees F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    Metric,
}

impl Units {
    pub fn as_query_param(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
        }
    }
}

/// Full configuration surface of the pipeline. Values layer up from
/// defaults, then an optional TOML file, then `NOAA_*` environment
/// variables (the API token is normally `NOAA_TOKEN`); CLI flags override
/// last.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub token: Option<String>,
    pub dataset: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub station_count: usize,
    pub units: Units,
    pub sleep_secs: f64,
    pub timeout_secs: u64,
    pub retries: u32,
    pub min_days_per_year: usize,
    pub hot_day_c: f64,
    pub very_hot_day_c: f64,
    pub warm_night_c: f64,
    pub country: String,
    pub friendly_names: HashMap<String, String>,
    pub bad_stations: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            dataset: "GHCND".to_string(),
            location: "FIPS:72".to_string(),
            start_date: NaiveDate::from_ymd_opt(1960, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"),
            station_count: 15,
            units: Units::Standard,
            sleep_secs: DEFAULT_SLEEP_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            min_days_per_year: MIN_DAYS_PER_YEAR,
            hot_day_c: HOT_DAY_C,
            very_hot_day_c: VERY_HOT_DAY_C,
            warm_night_c: WARM_NIGHT_C,
            country: "Puerto Rico".to_string(),
            friendly_names: HashMap::new(),
            bad_stations: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let cfg = builder
            .add_source(Environment::with_prefix("NOAA").try_parsing(true))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                PipelineError::Config(
                    "Missing API token. Set NOAA_TOKEN or add 'token' to the configuration file."
                        .to_string(),
                )
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs_f64(self.sleep_secs)
    }

    pub fn thresholds(&self) -> HeatThresholds {
        HeatThresholds {
            hot_day_c: self.hot_day_c,
            very_hot_day_c: self.very_hot_day_c,
            warm_night_c: self.warm_night_c,
        }
    }

    pub fn overrides(&self) -> StationOverrides {
        StationOverrides {
            friendly_names: self.friendly_names.clone(),
            bad_stations: self.bad_stations.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.dataset, "GHCND");
        assert_eq!(settings.station_count, 15);
        assert_eq!(settings.units, Units::Standard);
        assert_eq!(settings.min_days_per_year, 200);
        assert_eq!(settings.hot_day_c, 32.0);
        assert!(settings.require_token().is_err());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
token = "abc123"
location = "FIPS:12"
start_date = "1970-06-01"
station_count = 5
units = "metric"
bad_stations = ["MAYAGUEZ AIRPORT, PR US"]

[friendly_names]
"PONCE 4 E, PR US" = "Ponce"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.require_token().unwrap(), "abc123");
        assert_eq!(settings.location, "FIPS:12");
        assert_eq!(
            settings.start_date,
            NaiveDate::from_ymd_opt(1970, 6, 1).unwrap()
        );
        assert_eq!(settings.station_count, 5);
        assert_eq!(settings.units, Units::Metric);
        // Untouched fields keep their defaults
        assert_eq!(settings.dataset, "GHCND");
        assert_eq!(settings.retries, 3);

        let overrides = settings.overrides();
        assert!(overrides.bad_stations.contains("MAYAGUEZ AIRPORT, PR US"));
        assert_eq!(overrides.friendly_names["PONCE 4 E, PR US"], "Ponce");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = Settings::load(Some(Path::new("/nonexistent/heat-atlas.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_query_params() {
        assert_eq!(Units::Standard.as_query_param(), "standard");
        assert_eq!(Units::Metric.as_query_param(), "metric");
    }
}
