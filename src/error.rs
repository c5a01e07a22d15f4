use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Unresolved {kind} reference: id {id}")]
    Lookup { kind: &'static str, id: i64 },

    #[error("No station with id={} was found in the sensor service", display_station_id(.station_id))]
    NoStationFound { station_id: Option<i64> },

    #[error("Malformed sample value: {0}")]
    MalformedValue(String),

    #[error("Device feed {feed_id} is not part of this station")]
    UnresolvedFeed { feed_id: i64 },

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

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

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

fn display_station_id(station_id: &Option<i64>) -> String {
    station_id.map_or_else(|| "<unspecified>".to_string(), |id| id.to_string())
}

impl ProcessingError {
    pub fn lookup(kind: &'static str, id: i64) -> Self {
        ProcessingError::Lookup { kind, id }
    }

    /// True for errors the assembler recovers from locally instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProcessingError::MalformedValue(_) | ProcessingError::UnresolvedFeed { .. }
        )
    }
}
