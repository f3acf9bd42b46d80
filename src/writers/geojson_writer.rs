use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::models::StationHeatSummary;

/// GeoJSON feature collection of per-station heat metrics.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn validate(&self) -> Result<()> {
        if self.type_ != "FeatureCollection" {
            return Err(PipelineError::InvalidFormat(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub type_: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_: String,
    /// [longitude, latitude]
    pub coordinates: [f64; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Properties {
    pub id: String,
    pub name: String,
    pub country: String,
    /// metric name -> {year string -> value}
    pub metrics: BTreeMap<String, BTreeMap<String, Value>>,
}

pub fn feature_from_summary(summary: &StationHeatSummary, country: &str) -> Feature {
    let metrics = summary
        .metric_table()
        .into_iter()
        .map(|(name, by_year)| {
            let by_year = by_year
                .into_iter()
                .map(|(year, value)| {
                    (
                        year,
                        serde_json::to_value(value).unwrap_or(Value::Null),
                    )
                })
                .collect();
            (name.to_string(), by_year)
        })
        .collect();

    Feature {
        type_: "Feature".to_string(),
        geometry: Geometry {
            type_: "Point".to_string(),
            coordinates: [summary.longitude, summary.latitude],
        },
        properties: Properties {
            id: summary.id.clone(),
            name: summary.name.clone(),
            country: country.to_string(),
            metrics,
        },
    }
}

/// Writes and reads the aggregation artifact.
pub struct GeoJsonWriter;

impl GeoJsonWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize one feature per station, pretty-printed. Returns the
    /// feature count.
    pub fn write_summaries(
        &self,
        path: &Path,
        summaries: &[StationHeatSummary],
        country: &str,
    ) -> Result<usize> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let collection = FeatureCollection {
            type_: "FeatureCollection".to_string(),
            features: summaries
                .iter()
                .map(|summary| feature_from_summary(summary, country))
                .collect(),
        };

        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, &collection)?;

        Ok(collection.features.len())
    }

    pub fn read_feature_collection(&self, path: &Path) -> Result<FeatureCollection> {
        let file = BufReader::new(File::open(path)?);
        let collection: FeatureCollection = serde_json::from_reader(file)?;
        collection.validate()?;
        Ok(collection)
    }
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new()
    }
}
