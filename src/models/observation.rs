use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::utils::constants::{
    DATATYPE_TMAX, DATATYPE_TMIN, SCALED_MAGNITUDE_THRESHOLD, SENTINEL_FLOOR,
};

/// Raw observation payload as returned by the CDO `data` endpoint. Every
/// field is optional at the boundary; coercion decides what is usable.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObsVariable {
    Tmax,
    Tmin,
}

impl ObsVariable {
    pub fn from_datatype(datatype: &str) -> Option<Self> {
        match datatype {
            DATATYPE_TMAX => Some(ObsVariable::Tmax),
            DATATYPE_TMIN => Some(ObsVariable::Tmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObsVariable::Tmax => DATATYPE_TMAX,
            ObsVariable::Tmin => DATATYPE_TMIN,
        }
    }
}

/// A single usable daily observation after boundary coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub variable: ObsVariable,
    pub value: f64,
}

impl Observation {
    /// Coerce a raw payload into a typed observation. `None` marks a
    /// data-quality exclusion rather than an error: a missing or unparseable
    /// date, a datatype other than TMAX/TMIN, or a sentinel/non-numeric
    /// value.
    pub fn from_raw(raw: &RawObservation) -> Option<Self> {
        // Only the first 10 characters of the ISO timestamp are significant
        let date_str = raw.date.as_deref()?.get(..10)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
        let variable = ObsVariable::from_datatype(raw.datatype.as_deref()?)?;
        let value = normalize_value(raw.value.as_ref())?;

        Some(Self {
            date,
            variable,
            value,
        })
    }
}

/// Read a JSON value as a float, accepting numeric strings.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Map a raw API value to a usable temperature. `None` means missing: the
/// value was null, non-numeric, or at or below the sentinel floor. Values
/// whose magnitude exceeds the direct-degree threshold are tenths of a
/// degree and are scaled down by 10.
pub fn normalize_value(value: Option<&Value>) -> Option<f64> {
    let v = coerce_numeric(value?)?;
    if v <= SENTINEL_FLOOR {
        return None;
    }
    if v.abs() > SCALED_MAGNITUDE_THRESHOLD {
        Some(v / 10.0)
    } else {
        Some(v)
    }
}
