use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use heat_atlas::analyzers::{HeatAnalyzer, PeriodWindows, SummaryReporter};
use heat_atlas::api::transport::run_with_backoff;
use heat_atlas::error::{PipelineError, Result};
use heat_atlas::fetchers::daily_fetcher::{apply_observation, effective_range};
use heat_atlas::config::Units;
use heat_atlas::models::{DailyRecord, DailyRow, ObsVariable, Observation, Station};
use heat_atlas::readers::DailyCsvReader;
use heat_atlas::utils::units::celsius_to_fahrenheit;
use heat_atlas::writers::{DailyCsvWriter, GeoJsonWriter};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn daily_row(station: &str, day: NaiveDate, tmax_c: f64, tmin_c: f64) -> DailyRow {
    DailyRow {
        station: station.to_string(),
        name: format!("{}, PR US", station),
        latitude: 18.2208,
        longitude: -66.5901,
        date: day,
        tmax: celsius_to_fahrenheit(tmax_c),
        tmin: celsius_to_fahrenheit(tmin_c),
    }
}

/// One complete non-leap year: every day 30/20 C except ten 33 C days, five
/// 25 C nights, three of those nights falling on hot days.
fn scenario_year(station: &str, year: i32) -> Vec<DailyRow> {
    let start = date(year, 1, 1);
    let end = date(year, 12, 31);

    let mut rows: Vec<DailyRow> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| daily_row(station, d, 30.0, 20.0))
        .collect();
    assert_eq!(rows.len(), 365);

    for row in rows.iter_mut().take(10) {
        row.tmax = celsius_to_fahrenheit(33.0);
    }
    // Five warm nights, the first three of them on hot days
    for row in rows.iter_mut().skip(7).take(5) {
        row.tmin = celsius_to_fahrenheit(25.0);
    }

    rows
}

#[test]
fn test_scenario_a_yearly_counts() {
    let rows = scenario_year("RQC00666514", 2001);
    let summaries = HeatAnalyzer::new().analyze(&rows);

    assert_eq!(summaries.len(), 1);
    let metrics = &summaries[0].years[&2001];
    assert_eq!(metrics.hot_days, 10);
    assert_eq!(metrics.warm_nights, 5);
    assert!(metrics.oppressive_days <= 5);
    assert_eq!(metrics.oppressive_days, 3);
    assert_eq!(metrics.very_hot_days, 0);
}

#[test]
fn test_scenario_b_sparse_year_excluded() {
    let rows: Vec<DailyRow> = scenario_year("RQC00666514", 2001)
        .into_iter()
        .take(150)
        .collect();

    let summaries = HeatAnalyzer::new().analyze(&rows);
    assert!(summaries.is_empty());
}

#[test]
fn test_scenario_c_transport_recovers_from_503s() {
    let mut responses = vec![
        Err(PipelineError::ApiStatus {
            endpoint: "data".to_string(),
            status: 503,
        }),
        Err(PipelineError::ApiStatus {
            endpoint: "data".to_string(),
            status: 503,
        }),
        Ok("body".to_string()),
    ]
    .into_iter();

    let mut slept = Vec::new();
    let result = run_with_backoff(3, |d| slept.push(d), || responses.next().unwrap());

    assert_eq!(result.unwrap(), "body");
    assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[test]
fn test_scenario_d_disjoint_validity_window() {
    let station = Station {
        id: "GHCND:RQC00660061".to_string(),
        name: "ADJUNTAS SUBSTATION, PR US".to_string(),
        latitude: Some(18.17),
        longitude: Some(-66.79),
        elevation: Some(549.0),
        datacoverage: 0.6,
        mindate: Some(date(1980, 1, 1)),
        maxdate: Some(date(1985, 12, 31)),
    };

    // Requested range is entirely outside the validity window: no chunks
    // are fetched and the record set stays empty
    assert_eq!(effective_range(&station, date(1990, 1, 1), date(1999, 12, 31)), None);

    // With no rows for the station, the aggregation emits no feature for it
    let summaries = HeatAnalyzer::new().analyze(&[]);
    assert!(summaries.is_empty());
}

#[test]
fn test_acquisition_to_summary_round_trip() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("daily.csv");
    let geojson_path = dir.path().join("metrics.geojson");

    let station = Station {
        id: "GHCND:RQW00011641".to_string(),
        name: "SAN JUAN L M MARIN INTERNATIONAL AIRPORT, PR US".to_string(),
        latitude: Some(18.4325),
        longitude: Some(-66.0108),
        elevation: Some(2.7),
        datacoverage: 0.98,
        mindate: Some(date(1955, 1, 1)),
        maxdate: Some(date(2025, 6, 30)),
    };

    // A full year of 33/25 C days, merged the way pages arrive: TMAX and
    // TMIN delivered separately per date
    let mut days: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
    for day in date(2001, 1, 1).iter_days().take_while(|d| *d <= date(2001, 12, 31)) {
        apply_observation(
            &mut days,
            Observation {
                date: day,
                variable: ObsVariable::Tmax,
                value: 33.0,
            },
            Units::Metric,
        );
        apply_observation(
            &mut days,
            Observation {
                date: day,
                variable: ObsVariable::Tmin,
                value: 25.0,
            },
            Units::Metric,
        );
    }
    // One incomplete date: TMAX only, must not reach the artifact
    apply_observation(
        &mut days,
        Observation {
            date: date(2002, 1, 1),
            variable: ObsVariable::Tmax,
            value: 33.0,
        },
        Units::Metric,
    );

    let mut writer = DailyCsvWriter::create(&csv_path)?;
    let written = writer.write_station_days(&station, &days)?;
    writer.finish()?;
    assert_eq!(written, 365);

    let rows = DailyCsvReader::new().read_rows(&csv_path)?;
    assert_eq!(rows.len(), 365);
    assert_eq!(rows[0].station, "RQW00011641");

    let summaries = HeatAnalyzer::new().analyze(&rows);
    assert_eq!(summaries.len(), 1);
    let metrics = &summaries[0].years[&2001];
    assert_eq!(metrics.hot_days, 365);
    assert_eq!(metrics.warm_nights, 365);
    assert_eq!(metrics.oppressive_days, 365);

    let geojson = GeoJsonWriter::new();
    let feature_count = geojson.write_summaries(&geojson_path, &summaries, "Puerto Rico")?;
    assert_eq!(feature_count, 1);

    let collection = geojson.read_feature_collection(&geojson_path)?;
    let windows = PeriodWindows {
        early: (1961, 1980),
        late: (2000, 2005),
    };
    let report = SummaryReporter::new()
        .with_windows(windows)
        .summarize(&collection)?;

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].first_year, 2001);
    assert_eq!(report[0].last_year, 2001);
    assert_eq!(report[0].mean_hot32_early, None);
    assert_eq!(report[0].mean_hot32_late, Some(365.0));

    Ok(())
}

#[test]
fn test_station_selection_end_to_end() {
    // Raw payloads in coverage order, two sharing a locality, one without
    // coordinates
    let raw = [
        serde_json::json!({
            "id": "GHCND:A", "name": "SAN JUAN, PR US",
            "latitude": 18.4, "longitude": -66.0, "datacoverage": 0.99
        }),
        serde_json::json!({
            "id": "GHCND:B", "name": "SAN JUAN, PR RQ",
            "latitude": 18.5, "longitude": -66.1, "datacoverage": 0.95
        }),
        serde_json::json!({
            "id": "GHCND:C", "name": "PONCE 4 E, PR US",
            "datacoverage": 0.90
        }),
        serde_json::json!({
            "id": "GHCND:D", "name": "ARECIBO 3 ESE, PR US",
            "latitude": 18.45, "longitude": -66.7, "datacoverage": 0.80
        }),
    ];

    let stations: Vec<Station> = raw
        .into_iter()
        .map(|value| Station::from_value(value).unwrap())
        .collect();

    let selected = heat_atlas::fetchers::StationSelector::select(stations.clone(), 2).unwrap();
    let ids: Vec<&str> = selected.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["GHCND:A", "GHCND:D"]);

    // Asking for more distinct localities than exist is fatal
    let result = heat_atlas::fetchers::StationSelector::select(stations, 3);
    assert!(matches!(
        result,
        Err(PipelineError::InsufficientLocalities {
            found: 2,
            requested: 3
        })
    ));
}
