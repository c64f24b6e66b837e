use dataset_ingest::ingestion::json::{decode_json, decode_json_from_str};
use dataset_ingest::types::DatasetType;
use serde_json::json;

#[test]
fn decode_json_wraps_single_object() {
    let items = decode_json_from_str(r#"{"a":1}"#).unwrap();
    assert_eq!(items, vec![json!({"a": 1})]);
}

#[test]
fn decode_json_keeps_array_length_and_order() {
    let input = r#"[{"id":3},{"id":1},{"id":2}]"#;
    let items = decode_json_from_str(input).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items, vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2})]);
}

#[test]
fn decode_json_passes_heterogeneous_elements_through() {
    let input = r#"[{"a":1}, 2, "three", null, [4]]"#;
    let items = decode_json_from_str(input).unwrap();
    assert_eq!(items, vec![json!({"a": 1}), json!(2), json!("three"), json!(null), json!([4])]);
}

#[test]
fn decode_json_wraps_top_level_scalar() {
    assert_eq!(decode_json_from_str("42").unwrap(), vec![json!(42)]);
}

#[test]
fn decode_json_empty_array_is_empty_sequence() {
    assert!(decode_json_from_str("[]").unwrap().is_empty());
}

#[test]
fn decode_json_preserves_key_order() {
    let items = decode_json_from_str(r#"{"zeta":1,"alpha":2}"#).unwrap();
    let keys: Vec<&str> = items[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha"]);
}

#[test]
fn decode_json_strips_byte_order_mark() {
    let items = decode_json(b"\xEF\xBB\xBF[1,2]").unwrap();
    assert_eq!(items, vec![json!(1), json!(2)]);
}

#[test]
fn decode_json_errors_on_malformed_syntax_with_location() {
    let err = decode_json_from_str("{\n  \"a\": 1,\n  oops\n}").unwrap_err();

    assert_eq!(err.format, DatasetType::Json);
    assert!(err.to_string().contains("malformed JSON syntax"));
    assert!(err.context.as_deref().unwrap().starts_with("line 3"));
}

#[test]
fn decode_json_errors_on_empty_input() {
    let err = decode_json(b"").unwrap_err();
    assert!(err.to_string().contains("unexpected end of JSON input"));
}

#[test]
fn decode_json_errors_on_trailing_content() {
    assert!(decode_json_from_str(r#"{"a":1} {"a":2}"#).is_err());
}
