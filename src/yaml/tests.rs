use super::*;
use crate::error::ConfigError;
use crate::value::Value;

fn parse(content: &str) -> Value {
    parse_document(content, "<test>").unwrap()
}

#[test]
fn test_plain_scalar_type_inference() {
    let root = parse(
        "nothing: null\ntilde: ~\nyes_flag: true\nno_flag: False\ncount: 42\nneg: -7\nrate: 0.5\nexp: 1e3\ntext: hello\n",
    );
    let map = root.as_mapping().unwrap();
    assert_eq!(map["nothing"], Value::Null);
    assert_eq!(map["tilde"], Value::Null);
    assert_eq!(map["yes_flag"], Value::Bool(true));
    assert_eq!(map["no_flag"], Value::Bool(false));
    assert_eq!(map["count"], Value::Int(42));
    assert_eq!(map["neg"], Value::Int(-7));
    assert_eq!(map["rate"], Value::Float(0.5));
    assert_eq!(map["exp"], Value::Float(1000.0));
    assert_eq!(map["text"], Value::String("hello".to_string()));
}

#[test]
fn test_quoted_scalars_stay_strings() {
    let root = parse("a: \"42\"\nb: 'true'\nc: \"null\"\n");
    let map = root.as_mapping().unwrap();
    assert_eq!(map["a"], Value::String("42".to_string()));
    assert_eq!(map["b"], Value::String("true".to_string()));
    assert_eq!(map["c"], Value::String("null".to_string()));
}

#[test]
fn test_leading_zero_is_a_string() {
    let root = parse("octalish: 007\nzero: 0\n");
    let map = root.as_mapping().unwrap();
    assert_eq!(map["octalish"], Value::String("007".to_string()));
    assert_eq!(map["zero"], Value::Int(0));
}

#[test]
fn test_int_overflow_falls_back_to_string() {
    let root = parse("big: 99999999999999999999\n");
    assert_eq!(
        root.as_mapping().unwrap()["big"],
        Value::String("99999999999999999999".to_string())
    );
}

#[test]
fn test_empty_stream_is_null() {
    assert_eq!(parse(""), Value::Null);
}

#[test]
fn test_nested_structures() {
    let root = parse("server:\n  ports:\n    - 80\n    - 443\n  tls: true\n");
    let server = root.as_mapping().unwrap()["server"].as_mapping().unwrap();
    let ports = server["ports"].as_sequence().unwrap();
    assert_eq!(ports, &vec![Value::Int(80), Value::Int(443)]);
    assert_eq!(server["tls"], Value::Bool(true));
}

#[test]
fn test_aliases_rejected() {
    let err = parse_document("base: &a 1\nother: *a\n", "<test>").unwrap_err();
    match err {
        ConfigError::ParseError { message, .. } => {
            assert!(message.contains("aliases"), "message: {}", message);
        }
        other => panic!("expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_second_document_rejected() {
    let err = parse_document("a: 1\n---\nb: 2\n", "<test>").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_non_string_mapping_key_rejected() {
    let err = parse_document("1: one\n", "<test>").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_scan_error_carries_location() {
    let err = parse_document("key: [unclosed\n", "<test>").unwrap_err();
    match err {
        ConfigError::ParseError { name, line, .. } => {
            assert_eq!(name, "<test>");
            assert!(line > 0);
        }
        other => panic!("expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_emit_scalars_and_quoting() {
    let root = parse(
        "plain: hello\nnumberish: \"42\"\nboolish: \"true\"\nspaced: \" padded \"\ncolon: \"a: b\"\n",
    );
    let rendered = to_yaml_string(&root);
    assert!(rendered.contains("plain: hello\n"));
    assert!(rendered.contains("numberish: \"42\"\n"));
    assert!(rendered.contains("boolish: \"true\"\n"));
    assert!(rendered.contains("spaced: \" padded \"\n"));
    assert!(rendered.contains("colon: \"a: b\"\n"));
}

#[test]
fn test_emit_quotes_dotted_keys() {
    let mut map = indexmap::IndexMap::new();
    map.insert("a.b".to_string(), Value::Int(1));
    let rendered = to_yaml_string(&Value::Mapping(map));
    assert_eq!(rendered, "\"a.b\": 1\n");
}

#[test]
fn test_emit_floats_reparse_as_floats() {
    let mut map = indexmap::IndexMap::new();
    map.insert("whole".to_string(), Value::Float(2.0));
    map.insert("frac".to_string(), Value::Float(0.01));
    let rendered = to_yaml_string(&Value::Mapping(map));
    assert!(rendered.contains("whole: 2.0\n"));
    assert!(rendered.contains("frac: 0.01\n"));

    let reparsed = parse(&rendered);
    assert_eq!(reparsed.as_mapping().unwrap()["whole"], Value::Float(2.0));
}

#[test]
fn test_emit_empty_containers() {
    let root = parse("empty_map: {}\nempty_list: []\n");
    let rendered = to_yaml_string(&root);
    assert!(rendered.contains("empty_map: {}\n"));
    assert!(rendered.contains("empty_list: []\n"));
}

#[test]
fn test_round_trip() {
    let source = "db:\n  host: localhost\n  port: 5432\n  replicas:\n    - name: a\n      weight: 0.5\n    - name: b\n      weight: 1.5\nflags:\n  - on\n  - \"false\"\ncomment: \"has: colon\"\nmissing: null\n";
    let tree = parse(source);
    let rendered = to_yaml_string(&tree);
    assert_eq!(parse(&rendered), tree);
}
