//! Structured-text (JSON) decoder.
//!
//! Supported inputs:
//! - A JSON array: `[{"a":1}, {"a":2}]` is kept element for element.
//! - Any other JSON value: `{"a":1}` becomes `[{"a":1}]`.
//!
//! Elements are not validated; scalars and mixed shapes pass through unchanged.

use serde_json::Value;
use serde_json::error::Category;

use crate::error::{DecodeResult, ParseError};
use crate::types::DatasetType;

use super::columns::strip_bom;

/// Decode JSON bytes into a sequence of values.
pub fn decode_json(bytes: &[u8]) -> DecodeResult<Vec<Value>> {
    let value: Value = serde_json::from_slice(strip_bom(bytes)).map_err(json_parse_error)?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

/// Decode JSON from an in-memory string.
pub fn decode_json_from_str(input: &str) -> DecodeResult<Vec<Value>> {
    decode_json(input.as_bytes())
}

fn json_parse_error(err: serde_json::Error) -> ParseError {
    let message = match err.classify() {
        Category::Syntax => "malformed JSON syntax",
        Category::Eof => "unexpected end of JSON input",
        Category::Data => "invalid JSON data",
        Category::Io => "failed to read JSON input",
    };
    ParseError::new(DatasetType::Json, message)
        .with_context(format!("line {} column {}", err.line(), err.column()))
}
