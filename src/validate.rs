//! Row and URL checks performed before any network call

use reqwest::Url;

use crate::errors::RowError;
use crate::models::Row;

/// Parses `raw` as an absolute URL that carries both a scheme and a host.
pub fn parse_url(raw: &str) -> Result<Url, RowError> {
    let trimmed = raw.trim();
    let invalid = || RowError::InvalidUrl(trimmed.to_string());

    let url = Url::parse(trimmed).map_err(|_| invalid())?;
    if url.scheme().is_empty() {
        return Err(invalid());
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid()),
    }
}

pub fn is_valid_url(raw: &str) -> bool {
    parse_url(raw).is_ok()
}

/// Checks that a row has both fields and a usable URL.
///
/// Returns the trimmed file-name cell together with the parsed URL.
pub fn validate_row(row: &Row) -> Result<(String, Url), RowError> {
    let name = row.name.trim();
    if name.is_empty() {
        return Err(RowError::MissingField("file name"));
    }
    if row.url.trim().is_empty() {
        return Err(RowError::MissingField("URL"));
    }

    let url = parse_url(&row.url)?;
    Ok((name.to_string(), url))
}
