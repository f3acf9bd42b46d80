use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::{PipelineError, Result};
use crate::models::DailyRow;

/// Columns the aggregation stage requires. ELEVATION and TOBS are carried
/// by the artifact but not consumed here.
const REQUIRED_COLUMNS: [&str; 7] = [
    "STATION",
    "NAME",
    "LATITUDE",
    "LONGITUDE",
    "DATE",
    "TMAX",
    "TMIN",
];

/// Reads the acquisition CSV back into typed daily rows. Rows with a blank
/// TMAX or TMIN are data-quality exclusions and are skipped silently; a
/// missing column or an unparseable value is fatal.
pub struct DailyCsvReader;

impl DailyCsvReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_rows(&self, path: &Path) -> Result<Vec<DailyRow>> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers()?.clone();
        let columns = self.column_indices(&headers, path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(row) = self.parse_row(&record, &columns)? {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(PipelineError::MissingData(format!(
                "No non-missing TMAX/TMIN values in {}",
                path.display()
            )));
        }

        Ok(rows)
    }

    fn column_indices(&self, headers: &StringRecord, path: &Path) -> Result<[usize; 7]> {
        let mut indices = [0usize; 7];
        for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| {
                    PipelineError::MissingData(format!(
                        "Missing required column '{}' in {}",
                        column,
                        path.display()
                    ))
                })?;
        }
        Ok(indices)
    }

    fn parse_row(&self, record: &StringRecord, columns: &[usize; 7]) -> Result<Option<DailyRow>> {
        let field = |idx: usize| record.get(columns[idx]).unwrap_or("").trim();

        // Blank extremes mean an incomplete day
        let tmax_raw = field(5);
        let tmin_raw = field(6);
        if tmax_raw.is_empty() || tmin_raw.is_empty() {
            return Ok(None);
        }

        let parse_float = |raw: &str, column: &str| {
            raw.parse::<f64>().map_err(|_| {
                PipelineError::InvalidFormat(format!("Invalid {} value: '{}'", column, raw))
            })
        };

        Ok(Some(DailyRow {
            station: field(0).to_string(),
            name: field(1).to_string(),
            latitude: parse_float(field(2), "LATITUDE")?,
            longitude: parse_float(field(3), "LONGITUDE")?,
            date: NaiveDate::parse_from_str(field(4), "%Y-%m-%d")?,
            tmax: parse_float(tmax_raw, "TMAX")?,
            tmin: parse_float(tmin_raw, "TMIN")?,
        }))
    }
}

impl Default for DailyCsvReader {
    fn default() -> Self {
        Self::new()
    }
}
