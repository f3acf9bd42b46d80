use serde::Deserialize;
use serde_json::Value;

/// One page of the CDO response envelope. Both halves are optional: some
/// endpoints omit the metadata block entirely, and an exhausted offset
/// returns a body with no `results` key.
#[derive(Debug, Default, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub metadata: Option<PageMetadata>,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub resultset: Option<ResultSet>,
}

#[derive(Debug, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl ApiPage {
    /// Total result count when the server reports one.
    pub fn result_count(&self) -> Option<u64> {
        self.metadata.as_ref()?.resultset.as_ref()?.count
    }
}
