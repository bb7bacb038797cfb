#![cfg(feature = "json")]

use tlwire_schema::{EntryKind, Param, Schema, SchemaEntry, SchemaError};

#[test]
fn parses_single_entry_with_string_id() {
    let entry = SchemaEntry::from_json(r#"{
        "id": "85337187", "predicate": "resPQ", "params": [
            {"name": "nonce", "type": "int128"},
            {"name": "server_nonce", "type": "int128"},
            {"name": "pq", "type": "bytes"},
            {"name": "server_public_key_fingerprints", "type": "Vector<long>"}
        ], "type": "ResPQ"
    }"#).unwrap();
    assert_eq!(entry.id, Some(85337187));
    assert_eq!(entry.kind, EntryKind::Constructor);
    assert_eq!(entry.params[2], Param::new("pq", "bytes"));
    assert_eq!(entry.qualified_name(), "ResPQ");
}

#[test]
fn negative_ids_keep_their_bit_pattern() {
    let entry = SchemaEntry::from_json(
        r#"{"id": "-2083955988", "predicate": "p_q_inner_data", "params": [], "type": "P_Q_inner_data"}"#,
    ).unwrap();
    assert_eq!(entry.id, Some(0x83c95aec));

    let entry = SchemaEntry::from_json(
        r#"{"id": -627372787, "method": "invokeWithLayer", "params": [], "type": "X"}"#,
    ).unwrap();
    assert_eq!(entry.id, Some(0xda9b0d0d));
    assert_eq!(entry.kind, EntryKind::Method);
}

#[test]
fn missing_id_means_bare_only() {
    let entry = SchemaEntry::from_json(
        r#"{"predicate": "modelType", "params": [{"name": "payload", "type": "%Message"}], "type": "ModelType"}"#,
    ).unwrap();
    assert_eq!(entry.id, None);
}

#[test]
fn entry_needs_exactly_one_name_key() {
    let err = SchemaEntry::from_json(r#"{"params": [], "type": "A"}"#).unwrap_err();
    assert!(matches!(err, SchemaError::AmbiguousEntry { name: None }));

    let err = SchemaEntry::from_json(
        r#"{"predicate": "a", "method": "b", "params": [], "type": "A"}"#,
    ).unwrap_err();
    assert!(matches!(err, SchemaError::AmbiguousEntry { name: Some(_) }));
}

#[test]
fn invalid_id_is_reported() {
    let err = SchemaEntry::from_json(
        r#"{"id": "0x10", "predicate": "a", "params": [], "type": "A"}"#,
    ).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidId { .. }));
}

#[test]
fn parses_whole_schema() {
    let schema = Schema::from_json(r#"{
        "constructors": [
            {"id": "85337187", "predicate": "auth.resPQ", "params": [], "type": "auth.ResPQ"},
            {"id": "8768", "predicate": "auth.other.", "params": [], "type": "auth.Other"}
        ],
        "methods": [
            {"id": "1615239032", "method": "auth.req_pq",
             "params": [{"name": "nonce", "type": "int128"}], "type": "auth.ResPQ"}
        ]
    }"#).unwrap();
    assert_eq!(schema.len(), 3);
    assert_eq!(schema.constructors[1].qualified_name(), "auth.Other");
    assert_eq!(schema.methods[0].qualified_name(), "auth.req_pq");
}

#[test]
fn malformed_json_is_a_schema_error() {
    assert!(matches!(Schema::from_json("{"), Err(SchemaError::Json(_))));
}
