//! Spreadsheet workbook decoder (`.xlsx`, `.xls`).

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::{Number, Value};

use crate::error::{DecodeResult, ParseError};
use crate::types::{DatasetType, Row};

use super::columns::unique_headers;
use super::observability::IngestionWarning;

/// Header used for columns whose header cell is empty.
const EMPTY_HEADER: &str = "__EMPTY";

/// Decode every sheet of a workbook into rows keyed by that sheet's header row.
///
/// Behavior:
/// - The container format is detected from the content, so `.xls` and `.xlsx` share this path.
/// - The first row of each sheet's used range is its header; empty header cells are named
///   `__EMPTY`, `__EMPTY_1`, ... and repeated names are made unique.
/// - Cells missing from a row default to `""`; fully blank rows are dropped.
/// - A sheet with no data rows, or one that cannot be read, is left out of the result and a
///   warning is pushed to `warnings`.
///
/// Fails when the workbook cannot be opened, has no sheets, or no sheet has data.
pub fn decode_excel(
    bytes: &[u8],
    warnings: &mut Vec<IngestionWarning>,
) -> DecodeResult<BTreeMap<String, Vec<Row>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        ParseError::new(DatasetType::Excel, format!("cannot open workbook: {e}"))
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(ParseError::new(DatasetType::Excel, "workbook has no sheets"));
    }

    let mut sheets: BTreeMap<String, Vec<Row>> = BTreeMap::new();
    for sheet in sheet_names {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(sheet = %sheet, error = %e, "skipping unreadable sheet");
                warnings.push(IngestionWarning::UnreadableSheet {
                    sheet,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let rows = sheet_rows(&range);
        if rows.is_empty() {
            tracing::warn!(sheet = %sheet, "skipping empty sheet");
            warnings.push(IngestionWarning::EmptySheet { sheet });
            continue;
        }
        sheets.insert(sheet, rows);
    }

    if sheets.is_empty() {
        return Err(ParseError::new(
            DatasetType::Excel,
            "no valid data in any sheet",
        ));
    }
    Ok(sheets)
}

fn sheet_rows(range: &Range<Data>) -> Vec<Row> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let columns = unique_headers(header.iter().map(header_name));

    rows.filter(|row| row.iter().any(|c| !is_blank(c)))
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    let cell = row.get(idx).unwrap_or(&Data::Empty);
                    (column.clone(), cell_value(cell))
                })
                .collect()
        })
        .collect()
}

fn is_blank(c: &Data) -> bool {
    match c {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

fn header_name(c: &Data) -> String {
    match c {
        Data::Empty => EMPTY_HEADER.to_string(),
        Data::String(s) if s.is_empty() => EMPTY_HEADER.to_string(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        other => other.to_string(),
    }
}

fn cell_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::String(String::new()),
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => number_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        // Serial date number, the same value the cell stores.
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}

fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}
