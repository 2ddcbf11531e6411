use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

use crate::errors::RowError;

pub const DEFAULT_NAME_COLUMN: &str = "nom_fichier";
pub const DEFAULT_URL_COLUMN: &str = "url_pdf";

/// Header names of the two required CSV columns
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    pub name: String,
    pub url: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME_COLUMN.to_string(),
            url: DEFAULT_URL_COLUMN.to_string(),
        }
    }
}

/// One (file name, URL) pair from the input table. Absent fields are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based index among the data rows
    pub position: usize,
    pub name: String,
    pub url: String,
}

impl Row {
    pub fn new(position: usize, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { path: PathBuf, bytes: u64 },
    Failure(RowError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::Failure(_) => "failure",
        }
    }
}

/// Per-row entry of the run report
#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    pub position: usize,
    pub name: String,
    pub url: String,
    pub file: Option<PathBuf>,
    pub status: String,
    pub reason: Option<String>,
}

impl RowReport {
    pub fn new(row: &Row, outcome: &Outcome) -> Self {
        let (file, reason) = match outcome {
            Outcome::Success { path, .. } => (Some(path.clone()), None),
            Outcome::Failure(err) => (None, Some(err.to_string())),
        };

        Self {
            position: row.position,
            name: row.name.clone(),
            url: row.url.clone(),
            file,
            status: outcome.as_str().to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub rows: Vec<RowReport>,
}
