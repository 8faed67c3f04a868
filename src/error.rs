use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Structural problems with an in-memory [`Dataset`](crate::data::model::Dataset).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("column '{column}' has {found} values but the dataset has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),
    #[error("column name at position {0} is empty")]
    UnnamedColumn(usize),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("no row with index {0}")]
    UnknownRow(usize),
}

/// Failures reading or writing the tracker CSV file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}: row {row} has {found} fields, header has {expected}", path.display())]
    RaggedRow {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{}: {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: DatasetError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised by the column filter engine.
///
/// The engine itself has no failure modes beyond being pointed at a column
/// that does not exist; unparsable dates, empty results and inverted ranges
/// are all ordinary outcomes.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("cannot filter on unknown column '{0}'")]
    UnknownColumn(String),
}

/// Failures loading the tracker configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Invalid(String),
}
