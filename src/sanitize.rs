//! Turns arbitrary file-name cells into filesystem-safe `.pdf` names.

const PDF_SUFFIX: &str = ".pdf";

/// Sanitizes a raw file name.
///
/// - Keeps letters, digits, space, `.` and `_`
/// - Trims trailing whitespace
/// - Replaces spaces with `_`
/// - Appends `.pdf` unless the name already ends with it (any case)
///
/// Never fails. An empty input yields `.pdf`, so callers always join the result
/// under a fixed directory.
pub fn sanitize_file_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect();

    let mut name = kept.trim_end().replace(' ', "_");

    if !has_pdf_suffix(&name) {
        name.push_str(PDF_SUFFIX);
    }
    name
}

fn has_pdf_suffix(name: &str) -> bool {
    name.to_lowercase().ends_with(PDF_SUFFIX)
}
