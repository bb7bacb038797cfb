use tlwire_schema::tl::{Flag, ParamType, TypeExpr};
use tlwire_schema::{parse_tl_file, EntryKind, ParamParseError};

// ── .tl text ──────────────────────────────────────────────────────────────────

#[test]
fn parses_simple_type() {
    let src = "boolFalse#bc799737 = Bool;";
    let defs: Vec<_> = parse_tl_file(src).collect::<Result<_, _>>().unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "boolFalse");
    assert_eq!(defs[0].id, Some(0xbc799737));
    assert_eq!(defs[0].ty, "Bool");
}

#[test]
fn parses_function_category() {
    let src = "
---functions---
req_pq#60469778 nonce:int128 = ResPQ;
";
    let defs: Vec<_> = parse_tl_file(src).collect::<Result<_, _>>().unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].kind, EntryKind::Method);
    assert_eq!(defs[0].qualified_name(), "req_pq");
}

#[test]
fn parses_multiline_definition() {
    let src = "
resPQ#05162463 nonce:int128 server_nonce:int128
    pq:bytes server_public_key_fingerprints:Vector<long> = ResPQ;
";
    let defs: Vec<_> = parse_tl_file(src).collect::<Result<_, _>>().unwrap();
    assert_eq!(defs[0].params.len(), 4);
    assert_eq!(defs[0].params[3].ty, "Vector<long>");
}

#[test]
fn skips_blank_lines_and_comments() {
    let src = "
// this is a comment
boolTrue#997275b5 = Bool;
// another comment

boolFalse#bc799737 = Bool;
";
    let defs: Vec<_> = parse_tl_file(src).collect::<Result<_, _>>().unwrap();
    assert_eq!(defs.len(), 2);
}

#[test]
fn several_definitions_on_one_line() {
    let src = "boolFalse#bc799737 = Bool; boolTrue#997275b5 = Bool; // the two Bool constructors\n\
               true#3fedd339 = True;";
    let defs: Vec<_> = parse_tl_file(src).collect::<Result<_, _>>().unwrap();
    let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["boolFalse", "boolTrue", "true"]);
}

#[test]
fn crc32_derived_id() {
    let src = "boolFalse = Bool;";
    let defs: Vec<_> = parse_tl_file(src).collect::<Result<_, _>>().unwrap();
    assert_eq!(defs[0].id, Some(0xbc799737));
}

#[test]
fn bad_lines_do_not_stop_iteration() {
    let src = "
vector#1cb5c415 {t:Type} # [ t ] = Vector t;
boolTrue#997275b5 = Bool;
";
    let results: Vec<_> = parse_tl_file(src).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());
}

// ── Type expressions ──────────────────────────────────────────────────────────

#[test]
fn type_expr_prefixes() {
    let ty: TypeExpr = "!%auth.Message".parse().unwrap();
    assert!(ty.preserialized);
    assert!(ty.bare);
    assert_eq!(ty.namespace, vec!["auth"]);
    assert_eq!(ty.name, "Message");
    assert_eq!(ty.path(), "auth.Message");
    assert_eq!(ty.to_string(), "!%auth.Message");
}

#[test]
fn type_expr_generic() {
    let ty: TypeExpr = "vector<%Message>".parse().unwrap();
    assert!(ty.is_vector());
    assert!(!ty.bare);
    let inner = ty.generic_arg.unwrap();
    assert!(inner.bare);
    assert_eq!(inner.name, "Message");
}

#[test]
fn type_expr_rejects_malformed() {
    assert_eq!("Vector<long".parse::<TypeExpr>(), Err(ParamParseError::InvalidGeneric));
    assert_eq!("".parse::<TypeExpr>(), Err(ParamParseError::Empty));
    assert_eq!(".Foo".parse::<TypeExpr>(), Err(ParamParseError::Empty));
    assert!(matches!("Fo o".parse::<TypeExpr>(), Err(ParamParseError::InvalidName { .. })));
}

#[test]
fn param_type_flags() {
    assert_eq!("#".parse::<ParamType>().unwrap(), ParamType::Flags);
    match "flags.3?string".parse::<ParamType>().unwrap() {
        ParamType::Normal { ty, flag } => {
            assert_eq!(ty.name, "string");
            assert_eq!(flag, Some(Flag { name: "flags".into(), index: 3 }));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!("flags.40?int".parse::<ParamType>(), Err(ParamParseError::InvalidFlag));
    assert_eq!("flags?int".parse::<ParamType>(), Err(ParamParseError::InvalidFlag));
}
