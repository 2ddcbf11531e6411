//! Error types for ingestion, per-row processing and whole batches

use std::path::PathBuf;
use thiserror::Error;

use crate::batch::BatchState;

/// Structural problems with the input CSV. Any of these aborts the run
/// before a single download is attempted.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("CSV input is empty")]
    Empty,

    #[error("CSV input is malformed at line {line}: {source}")]
    Malformed {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("CSV input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Cannot read CSV input: {0}")]
    Read(#[from] std::io::Error),

    #[error("Cannot read CSV file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a single row failed. Recorded in the tally, never fatal to the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("cannot write {path}: {message}")]
    Filesystem { path: PathBuf, message: String },
}

/// Errors that stop a whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Batch cannot run from state {0:?}")]
    NotReady(BatchState),

    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
