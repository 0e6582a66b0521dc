use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load dataset {}: {source}", path.display())]
    Load { path: PathBuf, source: PolarsError },
    #[error("dataset `{table}` has no column `{column}`")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("unparseable purchase timestamp at row {row}: {value:?}")]
    Timestamp { row: usize, value: Option<String> },
    #[error("failed to transform dataset: {source}")]
    Transform {
        #[from]
        source: PolarsError,
    },
    #[error("invalid configuration {path}: {reason}")]
    Config { path: String, reason: String },
}

pub type DashboardResult<T> = Result<T, DashboardError>;
