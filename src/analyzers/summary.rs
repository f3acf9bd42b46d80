use std::collections::BTreeMap;
use std::io::Write;

use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::utils::constants::{METRIC_HOT_DAYS_32, METRIC_WARM_NIGHTS_24};
use crate::writers::geojson_writer::{Feature, FeatureCollection};

/// Inclusive year windows compared by the summary report.
#[derive(Debug, Clone, Copy)]
pub struct PeriodWindows {
    pub early: (i32, i32),
    pub late: (i32, i32),
}

impl Default for PeriodWindows {
    fn default() -> Self {
        Self {
            early: (1961, 1980),
            late: (2006, 2025),
        }
    }
}

/// Early-vs-late comparison for one station. Means are `None` when a window
/// contains no covered years.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPeriodSummary {
    pub name: String,
    pub id: String,
    pub first_year: i32,
    pub last_year: i32,
    pub mean_hot32_early: Option<f64>,
    pub mean_hot32_late: Option<f64>,
    pub mean_warm24_early: Option<f64>,
    pub mean_warm24_late: Option<f64>,
}

/// Reduces a metrics feature collection to per-station period means of the
/// hot-day and warm-night counts.
pub struct SummaryReporter {
    windows: PeriodWindows,
}

impl SummaryReporter {
    pub fn new() -> Self {
        Self {
            windows: PeriodWindows::default(),
        }
    }

    pub fn with_windows(mut self, windows: PeriodWindows) -> Self {
        self.windows = windows;
        self
    }

    pub fn summarize(&self, collection: &FeatureCollection) -> Result<Vec<StationPeriodSummary>> {
        collection
            .features
            .iter()
            .map(|feature| self.summarize_feature(feature))
            .collect()
    }

    fn summarize_feature(&self, feature: &Feature) -> Result<StationPeriodSummary> {
        let properties = &feature.properties;
        let hot32 = metric_series(&properties.metrics, METRIC_HOT_DAYS_32);
        let warm24 = metric_series(&properties.metrics, METRIC_WARM_NIGHTS_24);

        // The aggregation stage never emits a station without qualifying
        // years, so an empty hot-day series marks a foreign or corrupt file
        let first_year = hot32.keys().next().copied().ok_or_else(|| {
            PipelineError::MissingData(format!(
                "No hot-day years for station '{}'",
                properties.id
            ))
        })?;
        let last_year = hot32.keys().next_back().copied().unwrap_or(first_year);

        Ok(StationPeriodSummary {
            name: properties.name.clone(),
            id: properties.id.clone(),
            first_year,
            last_year,
            mean_hot32_early: mean_in_window(&hot32, self.windows.early),
            mean_hot32_late: mean_in_window(&hot32, self.windows.late),
            mean_warm24_early: mean_in_window(&warm24, self.windows.early),
            mean_warm24_late: mean_in_window(&warm24, self.windows.late),
        })
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the summary table as CSV.
pub fn write_summary_csv<W: Write>(rows: &[StationPeriodSummary], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "name",
        "id",
        "first_year",
        "last_year",
        "mean_hot32_early",
        "mean_hot32_late",
        "mean_warm24_early",
        "mean_warm24_late",
    ])?;

    for row in rows {
        let fmt = |mean: Option<f64>| mean.map(|m| format!("{:.2}", m)).unwrap_or_default();
        csv_writer.write_record([
            row.name.as_str(),
            row.id.as_str(),
            row.first_year.to_string().as_str(),
            row.last_year.to_string().as_str(),
            fmt(row.mean_hot32_early).as_str(),
            fmt(row.mean_hot32_late).as_str(),
            fmt(row.mean_warm24_early).as_str(),
            fmt(row.mean_warm24_late).as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Pull one metric out of the properties as year -> value, skipping year
/// keys or values that do not parse.
fn metric_series(
    metrics: &BTreeMap<String, BTreeMap<String, Value>>,
    name: &str,
) -> BTreeMap<i32, f64> {
    metrics
        .get(name)
        .map(|by_year| {
            by_year
                .iter()
                .filter_map(|(year, value)| {
                    Some((year.parse::<i32>().ok()?, value.as_f64()?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn mean_in_window(series: &BTreeMap<i32, f64>, (start, end): (i32, i32)) -> Option<f64> {
    let values: Vec<f64> = series
        .range(start..=end)
        .map(|(_, value)| *value)
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::geojson_writer::{Geometry, Properties};
    use serde_json::json;

    fn feature(years: &[(i32, i64, i64)]) -> Feature {
        let mut hot32 = BTreeMap::new();
        let mut warm24 = BTreeMap::new();
        for (year, hot, warm) in years {
            hot32.insert(year.to_string(), json!(hot));
            warm24.insert(year.to_string(), json!(warm));
        }

        let mut metrics = BTreeMap::new();
        metrics.insert(METRIC_HOT_DAYS_32.to_string(), hot32);
        metrics.insert(METRIC_WARM_NIGHTS_24.to_string(), warm24);

        Feature {
            type_: "Feature".to_string(),
            geometry: Geometry {
                type_: "Point".to_string(),
                coordinates: [-66.0, 18.4],
            },
            properties: Properties {
                id: "RQW00011641".to_string(),
                name: "San Juan (Airport)".to_string(),
                country: "Puerto Rico".to_string(),
                metrics,
            },
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            type_: "FeatureCollection".to_string(),
            features,
        }
    }

    #[test]
    fn test_period_means() {
        let fc = collection(vec![feature(&[
            (1961, 10, 2),
            (1970, 20, 4),
            (2006, 40, 10),
            (2010, 50, 14),
        ])]);

        let rows = SummaryReporter::new().summarize(&fc).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.first_year, 1961);
        assert_eq!(row.last_year, 2010);
        assert_eq!(row.mean_hot32_early, Some(15.0));
        assert_eq!(row.mean_hot32_late, Some(45.0));
        assert_eq!(row.mean_warm24_early, Some(3.0));
        assert_eq!(row.mean_warm24_late, Some(12.0));
    }

    #[test]
    fn test_empty_window_yields_none() {
        let fc = collection(vec![feature(&[(1990, 30, 8), (1995, 34, 9)])]);

        let rows = SummaryReporter::new().summarize(&fc).unwrap();
        assert_eq!(rows[0].mean_hot32_early, None);
        assert_eq!(rows[0].mean_hot32_late, None);
        assert_eq!(rows[0].first_year, 1990);
        assert_eq!(rows[0].last_year, 1995);
    }

    #[test]
    fn test_station_without_years_is_fatal() {
        let fc = collection(vec![feature(&[])]);
        assert!(SummaryReporter::new().summarize(&fc).is_err());
    }

    #[test]
    fn test_csv_output() {
        let fc = collection(vec![feature(&[(1961, 10, 2), (2010, 50, 14)])]);
        let rows = SummaryReporter::new().summarize(&fc).unwrap();

        let mut buffer = Vec::new();
        write_summary_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,id,first_year,last_year,mean_hot32_early,mean_hot32_late,mean_warm24_early,mean_warm24_late"
        );
        assert_eq!(
            lines.next().unwrap(),
            "San Juan (Airport),RQW00011641,1961,2010,10.00,50.00,2.00,14.00"
        );
    }

    #[test]
    fn test_custom_windows() {
        let fc = collection(vec![feature(&[(1950, 8, 1), (1955, 12, 3)])]);
        let windows = PeriodWindows {
            early: (1950, 1959),
            late: (1960, 1969),
        };

        let rows = SummaryReporter::new()
            .with_windows(windows)
            .summarize(&fc)
            .unwrap();
        assert_eq!(rows[0].mean_hot32_early, Some(10.0));
        assert_eq!(rows[0].mean_hot32_late, None);
    }
}
