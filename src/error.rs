use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("API request to '{endpoint}' failed with status {status}")]
    ApiStatus { endpoint: String, status: u16 },

    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: Box<PipelineError>,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Only found {found} stations with unique localities, need {requested}")]
    InsufficientLocalities { found: usize, requested: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl PipelineError {
    /// Whether a failed request may succeed on a retry. Covers rate limiting,
    /// server-side errors, and network-level timeout/connection faults.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::ApiStatus { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            PipelineError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}
