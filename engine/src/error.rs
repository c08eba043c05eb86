use shared::models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid indicator period {period}: period must be at least 1")]
    InvalidPeriod { period: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid price series: {source}")]
    SeriesError {
        #[from]
        source: ModelError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Price change into index {index} is not a finite number")]
    PriceOverflow { index: usize },

    #[error("Excel export error: {source}")]
    XlsxError {
        #[from]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl EngineError {
    /// Errors caused by what the user asked for, as opposed to broken data or IO.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidPeriod { .. }
                | EngineError::InvalidRequest(_)
                | EngineError::MarketDataError(_)
        )
    }
}
