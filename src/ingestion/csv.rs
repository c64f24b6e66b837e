//! Delimited-text (CSV) decoder.

use std::io::Read;

use serde_json::Value;

use crate::error::{DecodeResult, ParseError};
use crate::types::{DatasetType, Row};

use super::columns::{strip_bom, unique_headers};
use super::observability::IngestionWarning;

/// Decode CSV bytes into rows keyed by the header row.
///
/// Rules:
///
/// - The first row is the header; repeated names are made unique (`a`, `a_1`, ...).
/// - Every value is kept as the raw string (no trimming, no type conversion).
/// - Rows whose fields are all empty are dropped; a row with at least one non-empty field is
///   kept as-is.
/// - Rows shorter than the header leave the missing trailing columns out of the row.
/// - Fields beyond the header's width are dropped and reported as an
///   [`IngestionWarning::ExtraFields`] carrying the line number.
pub fn decode_csv(bytes: &[u8], delimiter: u8, warnings: &mut Vec<IngestionWarning>) -> DecodeResult<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(strip_bom(bytes));
    decode_csv_from_reader(&mut rdr, warnings)
}

/// Decode rows from an existing CSV reader.
///
/// The reader should be `flexible` so that short rows reach the row-length policy instead of
/// failing inside the reader.
pub fn decode_csv_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    warnings: &mut Vec<IngestionWarning>,
) -> DecodeResult<Vec<Row>> {
    let headers = rdr.headers().map_err(csv_parse_error)?.clone();
    if headers.is_empty() {
        return Err(ParseError::new(DatasetType::Csv, "no header row found"));
    }
    let columns = unique_headers(headers.iter().map(str::to_owned));

    let mut rows: Vec<Row> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_parse_error)?;

        if record.len() > columns.len() {
            let line = record.position().map_or(0, |pos| pos.line());
            tracing::warn!(
                line,
                fields = record.len(),
                columns = columns.len(),
                "dropping fields beyond the header"
            );
            warnings.push(IngestionWarning::ExtraFields {
                line,
                fields: record.len(),
                columns: columns.len(),
            });
        }

        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(column, raw)| (column.clone(), Value::String(raw.to_owned())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn csv_parse_error(err: csv::Error) -> ParseError {
    let context = err.position().map(|pos| format!("line {}", pos.line()));
    let message = match err.kind() {
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8 in field {}", err.field() + 1),
        csv::ErrorKind::Io(e) => format!("failed to read input: {e}"),
        _ => err.to_string(),
    };
    let parse_err = ParseError::new(DatasetType::Csv, message);
    match context {
        Some(c) => parse_err.with_context(c),
        None => parse_err,
    }
}
