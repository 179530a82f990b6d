use crate::types::{ColumnKind, Dataset};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(
        "missing dataset files in {}:\n  {}\nCopy these CSV files into {} (or point --data-dir at the folder holding them) and re-run.",
        .dir,
        .missing.join("\n  "),
        .dir
    )]
    MissingFiles { dir: String, missing: Vec<String> },

    #[error("failed to open {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{dataset} data has no column `{column}`")]
    MissingColumn { dataset: Dataset, column: String },

    #[error("column `{column}` of {dataset} data is {found}, expected {expected}")]
    ColumnType {
        dataset: Dataset,
        column: String,
        expected: ColumnKind,
        found: ColumnKind,
    },

    #[error("{dataset} data has no `{group}` groups with a `{value}` mean")]
    EmptyGroup {
        dataset: Dataset,
        group: String,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
