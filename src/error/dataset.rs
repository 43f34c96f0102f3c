use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse dataset '{dataset}': {source}")]
    Parse {
        dataset: String,
        #[source]
        source: csv::Error,
    },
    #[error("Dataset '{dataset}' has no usable records.")]
    Empty { dataset: String },
    #[error("Dataset '{dataset}' is missing required column '{field}'.")]
    MissingColumn { dataset: String, field: String },
    #[error("Dataset '{dataset}' line {line}: field '{field}' is missing or blank.")]
    MalformedRecord {
        dataset: String,
        line: u64,
        field: String,
    },
}
