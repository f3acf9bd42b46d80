use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;

use crate::models::{DailyRow, StationHeatSummary, YearlyMetrics};
use crate::utils::constants::{HOT_DAY_C, MIN_DAYS_PER_YEAR, VERY_HOT_DAY_C, WARM_NIGHT_C};
use crate::utils::units::fahrenheit_to_celsius;

/// Heat-stress thresholds, degrees Celsius.
#[derive(Debug, Clone, Copy)]
pub struct HeatThresholds {
    pub hot_day_c: f64,
    pub very_hot_day_c: f64,
    pub warm_night_c: f64,
}

impl Default for HeatThresholds {
    fn default() -> Self {
        Self {
            hot_day_c: HOT_DAY_C,
            very_hot_day_c: VERY_HOT_DAY_C,
            warm_night_c: WARM_NIGHT_C,
        }
    }
}

/// Externally supplied station tables: display-name overrides and stations
/// to drop entirely, both keyed by the raw station NAME.
#[derive(Debug, Clone, Default)]
pub struct StationOverrides {
    pub friendly_names: HashMap<String, String>,
    pub bad_stations: HashSet<String>,
}

/// Derives per-station, per-year heat metrics from complete daily rows.
/// Input temperatures are degrees Fahrenheit; thresholds are compared in
/// Celsius after conversion.
pub struct HeatAnalyzer {
    thresholds: HeatThresholds,
    min_days_per_year: usize,
    overrides: StationOverrides,
}

impl HeatAnalyzer {
    pub fn new() -> Self {
        Self {
            thresholds: HeatThresholds::default(),
            min_days_per_year: MIN_DAYS_PER_YEAR,
            overrides: StationOverrides::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: HeatThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_min_days_per_year(mut self, min_days: usize) -> Self {
        self.min_days_per_year = min_days;
        self
    }

    pub fn with_overrides(mut self, overrides: StationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Compute yearly metric sets, one summary per station with at least one
    /// qualifying year. Stations come out in ascending id order, years in
    /// ascending order within a station.
    pub fn analyze(&self, rows: &[DailyRow]) -> Vec<StationHeatSummary> {
        let mut by_station: BTreeMap<&str, Vec<&DailyRow>> = BTreeMap::new();
        for row in rows {
            by_station.entry(row.station.as_str()).or_default().push(row);
        }

        let mut summaries = Vec::new();
        for (station_id, station_rows) in by_station {
            if let Some(summary) = self.analyze_station(station_id, &station_rows) {
                summaries.push(summary);
            }
        }
        summaries
    }

    fn analyze_station(&self, station_id: &str, rows: &[&DailyRow]) -> Option<StationHeatSummary> {
        let first = rows.first()?;
        if self.overrides.bad_stations.contains(&first.name) {
            return None;
        }

        let mut by_year: BTreeMap<i32, Vec<&DailyRow>> = BTreeMap::new();
        for &row in rows {
            by_year.entry(row.date.year()).or_default().push(row);
        }

        let mut years = BTreeMap::new();
        for (year, year_rows) in by_year {
            if year_rows.len() < self.min_days_per_year {
                continue;
            }
            years.insert(year, self.year_metrics(&year_rows));
        }

        if years.is_empty() {
            return None;
        }

        let name = self
            .overrides
            .friendly_names
            .get(&first.name)
            .cloned()
            .unwrap_or_else(|| first.name.clone());

        Some(StationHeatSummary {
            id: station_id.to_string(),
            name,
            latitude: first.latitude,
            longitude: first.longitude,
            years,
        })
    }

    fn year_metrics(&self, rows: &[&DailyRow]) -> YearlyMetrics {
        let mut hot_days = 0;
        let mut very_hot_days = 0;
        let mut warm_nights = 0;
        let mut oppressive_days = 0;
        let mut months: BTreeMap<u32, MonthAccumulator> = BTreeMap::new();

        for row in rows {
            let tmax_c = fahrenheit_to_celsius(row.tmax);
            let tmin_c = fahrenheit_to_celsius(row.tmin);

            let hot = tmax_c >= self.thresholds.hot_day_c;
            let warm = tmin_c >= self.thresholds.warm_night_c;
            if hot {
                hot_days += 1;
            }
            if tmax_c >= self.thresholds.very_hot_day_c {
                very_hot_days += 1;
            }
            if warm {
                warm_nights += 1;
            }
            if hot && warm {
                oppressive_days += 1;
            }

            months.entry(row.date.month()).or_default().add(tmax_c, tmin_c);
        }

        // First maximum wins: iterating months in ascending order and
        // requiring a strictly greater mean breaks ties toward the lowest
        // month index
        let mut hottest_month = 0;
        let mut hottest_tmax = f64::NEG_INFINITY;
        let mut hottest_tmin = 0.0;
        for (month, acc) in &months {
            let mean_tmax = acc.mean_tmax();
            if mean_tmax > hottest_tmax {
                hottest_month = *month;
                hottest_tmax = mean_tmax;
                hottest_tmin = acc.mean_tmin();
            }
        }

        YearlyMetrics {
            hot_days,
            very_hot_days,
            warm_nights,
            oppressive_days,
            hottest_month,
            hottest_month_tmax_c: hottest_tmax,
            hottest_month_tmin_c: hottest_tmin,
        }
    }
}

impl Default for HeatAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct MonthAccumulator {
    tmax_sum: f64,
    tmin_sum: f64,
    count: usize,
}

impl MonthAccumulator {
    fn add(&mut self, tmax_c: f64, tmin_c: f64) {
        self.tmax_sum += tmax_c;
        self.tmin_sum += tmin_c;
        self.count += 1;
    }

    fn mean_tmax(&self) -> f64 {
        self.tmax_sum / self.count as f64
    }

    fn mean_tmin(&self) -> f64 {
        self.tmin_sum / self.count as f64
    }
}
