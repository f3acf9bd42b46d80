use std::collections::BTreeMap;

use serde::Serialize;

use crate::utils::constants::{
    METRIC_HOTTEST_MONTH_INDEX, METRIC_HOTTEST_MONTH_TMAX, METRIC_HOTTEST_MONTH_TMIN,
    METRIC_HOT_DAYS_32, METRIC_HOT_DAYS_35, METRIC_OPPRESSIVE_DAYS, METRIC_WARM_NIGHTS_24,
};

/// Heat-stress metrics for one qualifying calendar year. Means are degrees
/// Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyMetrics {
    pub hot_days: u32,
    pub very_hot_days: u32,
    pub warm_nights: u32,
    pub oppressive_days: u32,
    pub hottest_month: u32,
    pub hottest_month_tmax_c: f64,
    pub hottest_month_tmin_c: f64,
}

/// A metric value serializes as a bare JSON number: counts and month indices
/// as integers, monthly means as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u32),
    Degrees(f64),
}

/// Yearly metric sets for one station. Only stations with at least one
/// qualifying year are ever materialized.
#[derive(Debug, Clone)]
pub struct StationHeatSummary {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub years: BTreeMap<i32, YearlyMetrics>,
}

impl StationHeatSummary {
    /// Pivot into metric-name -> {year-string -> value}, the shape the
    /// GeoJSON properties carry.
    pub fn metric_table(&self) -> BTreeMap<&'static str, BTreeMap<String, MetricValue>> {
        let mut table: BTreeMap<&'static str, BTreeMap<String, MetricValue>> = BTreeMap::new();

        for (year, metrics) in &self.years {
            let year_key = year.to_string();
            let mut put = |name: &'static str, value: MetricValue| {
                table
                    .entry(name)
                    .or_default()
                    .insert(year_key.clone(), value);
            };

            put(METRIC_HOT_DAYS_32, MetricValue::Count(metrics.hot_days));
            put(METRIC_HOT_DAYS_35, MetricValue::Count(metrics.very_hot_days));
            put(METRIC_WARM_NIGHTS_24, MetricValue::Count(metrics.warm_nights));
            put(
                METRIC_OPPRESSIVE_DAYS,
                MetricValue::Count(metrics.oppressive_days),
            );
            put(
                METRIC_HOTTEST_MONTH_INDEX,
                MetricValue::Count(metrics.hottest_month),
            );
            put(
                METRIC_HOTTEST_MONTH_TMAX,
                MetricValue::Degrees(metrics.hottest_month_tmax_c),
            );
            put(
                METRIC_HOTTEST_MONTH_TMIN,
                MetricValue::Degrees(metrics.hottest_month_tmin_c),
            );
        }

        table
    }
}
