use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::info;

use crate::api::CdoClient;
use crate::error::{PipelineError, Result};
use crate::models::Station;
use crate::utils::constants::{DATATYPE_TMAX, DATATYPE_TMIN};

/// Discovers candidate stations for a location and picks one per distinct
/// locality, best data coverage first.
pub struct StationSelector<'a> {
    client: &'a CdoClient,
    page_delay: Duration,
}

impl<'a> StationSelector<'a> {
    pub fn new(client: &'a CdoClient) -> Self {
        Self {
            client,
            page_delay: Duration::ZERO,
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Fetch the full candidate list for the location and date range,
    /// restricted to stations reporting TMAX/TMIN.
    pub fn fetch_candidates(
        &self,
        dataset: &str,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Station>> {
        let params = vec![
            ("datasetid".to_string(), dataset.to_string()),
            ("locationid".to_string(), location.to_string()),
            ("startdate".to_string(), start.to_string()),
            ("enddate".to_string(), end.to_string()),
            ("datatypeid".to_string(), DATATYPE_TMAX.to_string()),
            ("datatypeid".to_string(), DATATYPE_TMIN.to_string()),
            ("sortfield".to_string(), "datacoverage".to_string()),
            ("sortorder".to_string(), "desc".to_string()),
        ];

        let mut stations = Vec::new();
        for batch in self.client.pages("stations", &params, self.page_delay) {
            for value in batch? {
                stations.push(Station::from_value(value)?);
            }
        }

        if stations.is_empty() {
            return Err(PipelineError::MissingData(
                "No stations returned. Check location and dates.".to_string(),
            ));
        }

        info!(candidates = stations.len(), "fetched station list");
        Ok(stations)
    }

    /// Rank by descending coverage and keep the first station seen for each
    /// locality until `count` are chosen. Stations without a usable locality
    /// key or coordinates are passed over. Too few distinct localities is a
    /// configuration error, not a transient fault.
    pub fn select(mut stations: Vec<Station>, count: usize) -> Result<Vec<Station>> {
        stations.sort_by(|a, b| {
            b.datacoverage
                .partial_cmp(&a.datacoverage)
                .unwrap_or(Ordering::Equal)
        });

        let mut selected = Vec::with_capacity(count);
        let mut seen = HashSet::new();

        for station in stations {
            let key = station.locality_key();
            if key.is_empty() || seen.contains(&key) || !station.has_coordinates() {
                continue;
            }
            seen.insert(key);
            selected.push(station);
            if selected.len() >= count {
                break;
            }
        }

        if selected.len() < count {
            return Err(PipelineError::InsufficientLocalities {
                found: selected.len(),
                requested: count,
            });
        }

        Ok(selected)
    }
}
