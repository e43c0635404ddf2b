use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a usable [`Dataset`](super::model::Dataset).
///
/// Every variant is fatal for the load: no partial dataset is returned.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("row {row}: sale value '{value}' is not a number")]
    InvalidSaleValue { row: usize, value: String },

    #[error("row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },
}

impl DataSourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataSourceError::Io {
            path: path.into(),
            source,
        }
    }
}
