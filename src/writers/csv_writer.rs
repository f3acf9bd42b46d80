use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{DailyRecord, Station};
use crate::utils::constants::CSV_COLUMNS;
use crate::utils::units::format_temperature;

/// Writes the acquisition artifact: fixed columns, one row per station-day
/// with both extremes present. TOBS is carried for column compatibility and
/// always left empty.
pub struct DailyCsvWriter {
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl DailyCsvWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record(CSV_COLUMNS)?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write the complete days for one station, ascending date order.
    /// Incomplete days are dropped here, at the last moment, so a TMAX-only
    /// date never reaches the artifact. Returns the rows written.
    pub fn write_station_days(
        &mut self,
        station: &Station,
        days: &BTreeMap<NaiveDate, DailyRecord>,
    ) -> Result<usize> {
        let latitude = station.latitude.map(fmt_f64).unwrap_or_default();
        let longitude = station.longitude.map(fmt_f64).unwrap_or_default();
        let elevation = station.elevation.map(fmt_f64).unwrap_or_default();

        let mut written = 0;
        for (date, record) in days {
            let (Some(tmax), Some(tmin)) = (record.tmax, record.tmin) else {
                continue;
            };

            self.writer.write_record([
                station.short_id(),
                station.name.as_str(),
                latitude.as_str(),
                longitude.as_str(),
                elevation.as_str(),
                date.to_string().as_str(),
                format_temperature(tmax).as_str(),
                format_temperature(tmin).as_str(),
                "",
            ])?;
            written += 1;
        }

        self.rows_written += written;
        Ok(written)
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn fmt_f64(value: f64) -> String {
    value.to_string()
}
