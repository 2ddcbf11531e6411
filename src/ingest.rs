//! CSV ingestion: header checks and row extraction

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::errors::InputError;
use crate::models::{Columns, Row};

/// Read all data rows from a CSV source with a header row.
///
/// The header must contain both configured columns. Records shorter than the
/// header are kept with empty fields, so they fail row validation later rather
/// than aborting the whole input. Blank lines are not records.
pub fn read_rows<R: Read>(mut reader: R, columns: &Columns) -> Result<Vec<Row>, InputError> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(InputError::Empty);
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_slice());

    let headers = rdr.headers().map_err(|e| malformed(1, e))?.clone();
    let (name_idx, url_idx) = locate_columns(&headers, columns)?;
    debug!(
        "Found columns '{}' at {} and '{}' at {}",
        columns.name, name_idx, columns.url, url_idx
    );

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(line, e)
        })?;

        rows.push(Row::new(
            index + 1,
            record.get(name_idx).unwrap_or(""),
            record.get(url_idx).unwrap_or(""),
        ));
    }

    Ok(rows)
}

pub fn read_rows_from_path(path: &Path, columns: &Columns) -> Result<Vec<Row>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows(BufReader::new(file), columns)
}

/// First `n` rows, for showing the user what is about to be downloaded.
pub fn preview(rows: &[Row], n: usize) -> &[Row] {
    &rows[..n.min(rows.len())]
}

fn locate_columns(headers: &StringRecord, columns: &Columns) -> Result<(usize, usize), InputError> {
    let find = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
    };

    match (find(columns.name.as_str()), find(columns.url.as_str())) {
        (Some(name_idx), Some(url_idx)) => Ok((name_idx, url_idx)),
        (name_idx, url_idx) => {
            let mut missing = Vec::new();
            if name_idx.is_none() {
                missing.push(columns.name.clone());
            }
            if url_idx.is_none() {
                missing.push(columns.url.clone());
            }
            Err(InputError::MissingColumns(missing))
        }
    }
}

fn malformed(line: u64, source: csv::Error) -> InputError {
    InputError::Malformed { line, source }
}
