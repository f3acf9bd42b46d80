use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::models::observation::coerce_numeric;

/// Raw station payload as returned by the CDO `stations` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub datacoverage: Option<Value>,
    #[serde(default)]
    pub mindate: Option<String>,
    #[serde(default)]
    pub maxdate: Option<String>,
}

/// A weather station as selected for acquisition. Immutable once built;
/// coordinates and the validity window stay optional because the API omits
/// them for some stations.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Station {
    pub id: String,
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub elevation: Option<f64>,

    /// Fraction [0, 1] of the historical record present; 0 when the API
    /// reports nothing usable
    pub datacoverage: f64,

    pub mindate: Option<NaiveDate>,
    pub maxdate: Option<NaiveDate>,
}

impl Station {
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawStation = serde_json::from_value(value)?;
        Self::try_from(raw)
    }

    /// Dedup key: the part of the name before the first comma, upper-cased.
    pub fn locality_key(&self) -> String {
        locality_key(&self.name)
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Station id without the dataset namespace prefix,
    /// e.g. "GHCND:RQW00011641" -> "RQW00011641"
    pub fn short_id(&self) -> &str {
        self.id
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.id)
    }
}

impl TryFrom<RawStation> for Station {
    type Error = PipelineError;

    fn try_from(raw: RawStation) -> Result<Self> {
        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PipelineError::MissingField("station.id".to_string()))?;
        let name = raw
            .name
            .ok_or_else(|| PipelineError::MissingField("station.name".to_string()))?;

        let datacoverage = raw
            .datacoverage
            .as_ref()
            .and_then(coerce_numeric)
            .unwrap_or(0.0);

        let station = Station {
            id,
            name,
            latitude: raw.latitude,
            longitude: raw.longitude,
            elevation: raw.elevation,
            datacoverage,
            mindate: parse_window_date(raw.mindate.as_deref())?,
            maxdate: parse_window_date(raw.maxdate.as_deref())?,
        };

        station.validate()?;

        Ok(station)
    }
}

/// Validity window dates arrive as "YYYY-MM-DD" or a full ISO timestamp;
/// only the first 10 characters are significant.
fn parse_window_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) => {
            let prefix = s.get(..10).ok_or_else(|| {
                PipelineError::InvalidFormat(format!("Invalid validity date: '{}'", s))
            })?;
            Ok(Some(NaiveDate::parse_from_str(prefix, "%Y-%m-%d")?))
        }
    }
}

pub fn locality_key(name: &str) -> String {
    let head = match name.split_once(',') {
        Some((head, _)) => head,
        None => name,
    };
    head.trim().to_uppercase()
}
