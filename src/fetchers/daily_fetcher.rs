use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::api::CdoClient;
use crate::config::Units;
use crate::error::Result;
use crate::models::{DailyRecord, Observation, RawObservation, Station};
use crate::utils::constants::{DATATYPE_TMAX, DATATYPE_TMIN};
use crate::utils::units::celsius_to_fahrenheit;

/// Fetches the daily TMAX/TMIN series for one station, walking the
/// effective date range one calendar year at a time and merging pages into
/// a per-date record set.
pub struct DailyFetcher<'a> {
    client: &'a CdoClient,
    dataset: String,
    units: Units,
    page_delay: Duration,
}

impl<'a> DailyFetcher<'a> {
    pub fn new(client: &'a CdoClient, dataset: &str, units: Units) -> Self {
        Self {
            client,
            dataset: dataset.to_string(),
            units,
            page_delay: Duration::ZERO,
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Retrieve all usable observations for the station, restricted to the
    /// intersection of the requested range and the station's validity
    /// window. An empty intersection yields an empty record set, not an
    /// error. Records fill field-by-field; a date is complete only once
    /// both TMAX and TMIN have arrived, possibly from different pages.
    pub fn fetch(
        &self,
        station: &Station,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, DailyRecord>> {
        let mut by_date = BTreeMap::new();

        let Some((start, end)) = effective_range(station, start, end) else {
            debug!(station = %station.id, "requested range outside station validity window");
            return Ok(by_date);
        };

        for (chunk_start, chunk_end) in year_chunks(start, end) {
            let params = vec![
                ("datasetid".to_string(), self.dataset.clone()),
                ("stationid".to_string(), station.id.clone()),
                ("datatypeid".to_string(), DATATYPE_TMAX.to_string()),
                ("datatypeid".to_string(), DATATYPE_TMIN.to_string()),
                ("units".to_string(), self.units.as_query_param().to_string()),
                ("startdate".to_string(), chunk_start.to_string()),
                ("enddate".to_string(), chunk_end.to_string()),
            ];

            for batch in self.client.pages("data", &params, self.page_delay) {
                for value in batch? {
                    let raw: RawObservation = serde_json::from_value(value)?;
                    if let Some(observation) = Observation::from_raw(&raw) {
                        apply_observation(&mut by_date, observation, self.units);
                    }
                }
            }
        }

        debug!(station = %station.id, dates = by_date.len(), "daily series fetched");
        Ok(by_date)
    }
}

/// Merge one observation into the per-date accumulator, converting metric
/// responses to Fahrenheit so the record set carries a single unit.
pub fn apply_observation(
    by_date: &mut BTreeMap<NaiveDate, DailyRecord>,
    observation: Observation,
    units: Units,
) {
    let value = match units {
        Units::Metric => celsius_to_fahrenheit(observation.value),
        Units::Standard => observation.value,
    };
    by_date
        .entry(observation.date)
        .or_default()
        .set(observation.variable, value);
}

/// Intersect the requested range with the station validity window.
pub fn effective_range(
    station: &Station,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = station.mindate.map_or(start, |min| start.max(min));
    let end = station.maxdate.map_or(end, |max| end.min(max));
    (start <= end).then_some((start, end))
}

/// Split a date range into calendar-year chunks, boundary years clipped to
/// the range. Bounds per-request payloads: a year of daily TMAX/TMIN fits
/// well inside one page.
pub fn year_chunks(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    (start.year()..=end.year())
        .map(|year| {
            let first = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date");
            let last = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid date");
            (first.max(start), last.min(end))
        })
        .collect()
}
