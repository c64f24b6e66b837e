use dataset_ingest::ingestion::csv::{decode_csv, decode_csv_from_reader};
use dataset_ingest::ingestion::IngestionWarning;
use dataset_ingest::types::{DatasetType, Row};
use serde_json::json;

fn decode(input: &[u8], delimiter: u8) -> dataset_ingest::error::DecodeResult<Vec<Row>> {
    decode_csv(input, delimiter, &mut Vec::new())
}

fn keys(row: &Row) -> Vec<&str> {
    row.keys().map(String::as_str).collect()
}

#[test]
fn decode_csv_drops_blank_rows() {
    let input = "date,amount\n2024-01-01,100\n,\n2024-01-02,200\n";
    let rows = decode(input.as_bytes(), b',').unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], json!("2024-01-01"));
    assert_eq!(rows[0]["amount"], json!("100"));
    assert_eq!(rows[1]["date"], json!("2024-01-02"));
    assert_eq!(rows[1]["amount"], json!("200"));
}

#[test]
fn decode_csv_row_keys_match_header() {
    let input = "id,name,score\n1,Ada,98.5\n2,Grace,87.25\n3,Linus,77\n";
    let rows = decode(input.as_bytes(), b',').unwrap();

    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(keys(row), vec!["id", "name", "score"]);
    }
}

#[test]
fn decode_csv_keeps_partially_empty_rows() {
    let input = "a,b,c\n,x,\n";
    let rows = decode(input.as_bytes(), b',').unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["a"], json!(""));
    assert_eq!(rows[0]["b"], json!("x"));
}

#[test]
fn decode_csv_values_are_untouched_strings() {
    let input = "name,note,count\n  Ada ,\"quoted, with comma\",007\n";
    let rows = decode(input.as_bytes(), b',').unwrap();
    assert_eq!(rows[0]["name"], json!("  Ada "));
    assert_eq!(rows[0]["note"], json!("quoted, with comma"));
    assert_eq!(rows[0]["count"], json!("007"));
}

#[test]
fn decode_csv_short_rows_leave_trailing_columns_absent() {
    let input = "a,b,c\n1,2\n";
    let rows = decode(input.as_bytes(), b',').unwrap();

    assert_eq!(keys(&rows[0]), vec!["a", "b"]);
    assert!(rows[0].get("c").is_none());
}

#[test]
fn decode_csv_drops_fields_beyond_header_with_warning() {
    let input = "a,b\n1,2\n3,4,5,6\n7,8\n";
    let mut warnings = Vec::new();
    let rows = decode_csv(input.as_bytes(), b',', &mut warnings).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(keys(&rows[1]), vec!["a", "b"]);
    assert_eq!(rows[1]["b"], json!("4"));
    assert_eq!(
        warnings,
        vec![IngestionWarning::ExtraFields {
            line: 3,
            fields: 4,
            columns: 2
        }]
    );
    assert!(warnings[0].to_string().contains("line 3 has 4 fields but the header has 2"));
}

#[test]
fn decode_csv_renames_repeated_headers() {
    let input = "x,x,y\n1,2,3\n";
    let rows = decode(input.as_bytes(), b',').unwrap();
    assert_eq!(keys(&rows[0]), vec!["x", "x_1", "y"]);
    assert_eq!(rows[0]["x_1"], json!("2"));
}

#[test]
fn decode_csv_strips_byte_order_mark() {
    let input = b"\xEF\xBB\xBFid,name\n1,Ada\n";
    let rows = decode(input, b',').unwrap();
    assert_eq!(keys(&rows[0]), vec!["id", "name"]);
}

#[test]
fn decode_csv_honors_delimiter() {
    let input = "id;name\n1;Ada\n";
    let rows = decode(input.as_bytes(), b';').unwrap();
    assert_eq!(rows[0]["name"], json!("Ada"));
}

#[test]
fn decode_csv_header_only_yields_no_rows() {
    let rows = decode(b"id,name\n", b',').unwrap();
    assert!(rows.is_empty());
}

#[test]
fn decode_csv_errors_on_empty_input() {
    let err = decode(b"", b',').unwrap_err();
    assert_eq!(err.format, DatasetType::Csv);
    assert!(err.to_string().contains("no header row found"));
}

#[test]
fn decode_csv_errors_on_invalid_utf8_with_line() {
    let input = b"id,name\n1,Ada\n2,\xFF\xFE\n";
    let err = decode(input, b',').unwrap_err();

    assert!(err.to_string().contains("invalid UTF-8"));
    assert_eq!(err.context.as_deref(), Some("line 3"));
}

#[test]
fn decode_csv_from_existing_reader() {
    let input = "id,name\n1,Ada\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let rows = decode_csv_from_reader(&mut rdr, &mut Vec::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!("1"));
}
