//! Error types for the analysis pipeline.
//!
//! [`AnalysisError`] covers failures at the load boundary and anything that
//! aborts a whole run. [`TickerError`] is the per-ticker skip taxonomy: every
//! variant stops one ticker's pass and nothing else.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loading, configuration and persistence.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("{} is missing required columns: {}", path.display(), missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("No data: {0}")]
    NoData(String),
}

/// Why a single ticker was skipped.
#[derive(Error, Debug)]
pub enum TickerError {
    #[error("price file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("no news rows for ticker")]
    NoNews,

    #[error("insufficient data points ({found} < {required})")]
    InsufficientSamples { found: usize, required: usize },

    #[error("degenerate series: {column} column has zero variance")]
    DegenerateSeries { column: &'static str },

    #[error("{count} bars with non-positive close")]
    InvalidPrices { count: usize },

    #[error("failed to load price data: {0}")]
    Load(#[source] AnalysisError),

    #[error("failed to write output: {0}")]
    Persist(#[source] AnalysisError),
}

impl TickerError {
    /// Short machine-readable label, used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            TickerError::MissingFile { .. } => "missing_file",
            TickerError::NoNews => "empty_filter",
            TickerError::InsufficientSamples { .. } => "insufficient_samples",
            TickerError::DegenerateSeries { .. } => "degenerate_series",
            TickerError::InvalidPrices { .. } => "invalid_prices",
            TickerError::Load(_) => "load_error",
            TickerError::Persist(_) => "persist_error",
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = AnalysisError::MissingColumns {
            path: PathBuf::from("news.csv"),
            missing: vec!["headline".to_string(), "stock".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "news.csv is missing required columns: headline, stock"
        );
    }

    #[test]
    fn test_ticker_error_kinds() {
        assert_eq!(TickerError::NoNews.kind(), "empty_filter");
        let err = TickerError::InsufficientSamples {
            found: 4,
            required: 5,
        };
        assert_eq!(err.kind(), "insufficient_samples");
        assert_eq!(err.to_string(), "insufficient data points (4 < 5)");
    }
}
