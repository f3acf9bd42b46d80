use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::observation::ObsVariable;

/// Per-date accumulator for one station. TMAX and TMIN for the same date may
/// arrive on different result pages, so each slot fills independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyRecord {
    pub tmax: Option<f64>,
    pub tmin: Option<f64>,
}

impl DailyRecord {
    pub fn set(&mut self, variable: ObsVariable, value: f64) {
        match variable {
            ObsVariable::Tmax => self.tmax = Some(value),
            ObsVariable::Tmin => self.tmin = Some(value),
        }
    }

    /// A day is usable downstream only when both extremes are present.
    pub fn is_complete(&self) -> bool {
        self.tmax.is_some() && self.tmin.is_some()
    }
}

/// A complete station-day as written to and read from the acquisition CSV.
/// Temperatures are degrees Fahrenheit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRow {
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
    pub tmax: f64,
    pub tmin: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fills_field_by_field() {
        let mut record = DailyRecord::default();
        assert!(!record.is_complete());

        record.set(ObsVariable::Tmax, 91.0);
        assert!(!record.is_complete());
        assert_eq!(record.tmax, Some(91.0));

        record.set(ObsVariable::Tmin, 75.0);
        assert!(record.is_complete());
        assert_eq!(record.tmin, Some(75.0));
    }

    #[test]
    fn test_later_value_overwrites() {
        let mut record = DailyRecord::default();
        record.set(ObsVariable::Tmax, 91.0);
        record.set(ObsVariable::Tmax, 93.0);
        assert_eq!(record.tmax, Some(93.0));
    }
}
