//! Download the PDFs listed in a CSV file.
//!
//! The input is a CSV with a file-name column and a URL column. Each row is
//! validated, its name sanitized, and the document fetched into one output
//! directory per run. Front-ends observe progress through [`events::BatchObserver`].

pub mod batch;
pub mod config;
pub mod downloader;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod models;
pub mod sanitize;
pub mod tui;
pub mod validate;

pub use batch::{Batch, BatchState};
pub use errors::{BatchError, InputError, RowError};
pub use models::{Columns, Outcome, Row, Summary};
