//! Batch processing: CSV text to a validated entity list
//!
//! The whole file is always scanned so the caller gets every row error in a
//! single response. A batch with any invalid row is rejected as a whole;
//! only structural CSV problems stop processing early.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::schema::{normalize_header, validate_row, RawRow};
use super::CsvEntity;
use crate::models::{RowError, SessionId};

/// Added to the 0-based data row index so reported numbers match the line a
/// spreadsheet editor shows (one for the header, one for 1-based counting)
pub const HEADER_ROW_OFFSET: usize = 2;

/// Why a batch produced no entities
#[derive(Debug, Error)]
pub enum BatchError {
    /// Structural problem; no reliable row boundaries, so no row diagnostics
    #[error("CSV parsing failed: {}", .0.join("; "))]
    Parse(Vec<String>),

    /// Header present (or not) but zero data rows
    #[error("CSV file is empty")]
    Empty,

    /// One or more rows broke the schema or an entity invariant
    #[error("{} row(s) have validation errors", .0.len())]
    Invalid(Vec<RowError>),
}

/// Report quoting the CSV reader would otherwise accept silently
///
/// A quoted field must be closed before end of input, and its closing quote
/// must be followed by a delimiter or a line break. Line numbers are the
/// physical line where the offending field sits.
fn check_quoting(text: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let mut line = 1usize;
    let mut at_field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if at_field_start => {
                let opened_on = line;
                let mut closed = false;

                while let Some(q) = chars.next() {
                    match q {
                        '"' if chars.peek() == Some(&'"') => {
                            chars.next();
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\n' => line += 1,
                        _ => {}
                    }
                }

                if !closed {
                    // Everything after the opening quote belongs to one field
                    errors.push(format!("Row {}: unterminated quoted field", opened_on));
                    return errors;
                }

                if !matches!(chars.peek(), None | Some(',' | '\n' | '\r')) {
                    errors.push(format!("Row {}: unexpected text after closing quote", line));
                    while chars.next_if(|n| *n != ',' && *n != '\n').is_some() {}
                }
                at_field_start = false;
            }
            ',' => at_field_start = true,
            '\n' => {
                line += 1;
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }

    errors
}

/// Normalize header cells; two columns resolving to one name is an error
fn normalize_headers(record: &csv::StringRecord) -> Result<Vec<String>, Vec<String>> {
    let headers: Vec<String> = record.iter().map(normalize_header).collect();

    let mut seen = HashSet::new();
    let duplicates: Vec<String> = headers
        .iter()
        .filter(|name| !name.is_empty() && !seen.insert(name.as_str()))
        .map(|name| format!("Header: duplicate column '{}'", name))
        .collect();

    if duplicates.is_empty() {
        Ok(headers)
    } else {
        Err(duplicates)
    }
}

/// Split CSV text into raw rows keyed by normalized header
///
/// Blank lines are skipped. Malformed quoting, duplicate columns and a
/// record whose field count differs from the header are structural errors.
/// All structural errors are collected before returning.
pub fn read_rows(text: &str) -> Result<Vec<RawRow>, Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let quoting = check_quoting(text);
    if !quoting.is_empty() {
        return Err(quoting);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(record) => normalize_headers(record)?,
        Err(e) => return Err(vec![format!("Header: {}", e)]),
    };

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let fallback_line = (index + HEADER_ROW_OFFSET) as u64;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                errors.push(format!("Row {}: {}", line, e));
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
            errors.push(format!(
                "Row {}: expected {} fields, found {}",
                line,
                headers.len(),
                record.len()
            ));
            continue;
        }

        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }

    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(errors)
    }
}

/// Schema check, transform, then entity check for one row
fn validate_entity<E: CsvEntity>(raw: &RawRow, session_id: &SessionId) -> Result<E, Vec<String>> {
    let typed = validate_row(raw, E::FIELDS)?;
    let entity = E::from_row(&typed, session_id);

    let violations = entity.violations();
    if violations.is_empty() {
        Ok(entity)
    } else {
        Err(violations)
    }
}

/// Parse, validate and transform every row of `text`
///
/// Returns one entity per non-blank data row, in file order, or the
/// complete list of row errors.
pub fn process_batch<E: CsvEntity>(text: &str, session_id: &SessionId) -> Result<Vec<E>, BatchError> {
    let rows = read_rows(text).map_err(|errors| {
        warn!(kind = %E::KIND, errors = errors.len(), "CSV structure rejected");
        BatchError::Parse(errors)
    })?;

    if rows.is_empty() {
        return Err(BatchError::Empty);
    }

    let mut entities = Vec::with_capacity(rows.len());
    let mut row_errors = Vec::new();

    for (index, raw) in rows.iter().enumerate() {
        let row_number = index + HEADER_ROW_OFFSET;

        match validate_entity::<E>(raw, session_id) {
            Ok(entity) => entities.push(entity),
            Err(violations) => {
                debug!(kind = %E::KIND, row_number, ?violations, "Row rejected");
                row_errors.push(RowError {
                    row_number,
                    raw_row: raw
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<BTreeMap<_, _>>(),
                    violations,
                });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(
            kind = %E::KIND,
            rows = rows.len(),
            invalid_rows = row_errors.len(),
            "CSV batch rejected"
        );
        return Err(BatchError::Invalid(row_errors));
    }

    info!(kind = %E::KIND, rows = entities.len(), "CSV batch validated");
    Ok(entities)
}
