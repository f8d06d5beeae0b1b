//! Block-style YAML emitter.
//!
//! Left inverse of the parser's type-inference rules: any string that the
//! parser would read back as a bool, null, or number is double-quoted, as
//! are strings containing structural characters or layout-sensitive
//! whitespace. Mapping keys containing `.` are quoted so dotted-path
//! navigation stays unambiguous.

use std::path::Path;

use crate::error::ConfigError;
use crate::value::Value;

use super::parser::{is_float_literal, is_int_literal};

fn is_bool_or_null_keyword(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower == "true" || lower == "false" || lower == "null" || lower == "~"
}

fn needs_quoting(value: &str, is_key: bool) -> bool {
    if value.is_empty() {
        return true;
    }
    if is_bool_or_null_keyword(value) || is_int_literal(value) || is_float_literal(value) {
        return true;
    }
    if value.chars().any(|ch| ":#&*?|-<>=!%@".contains(ch)) {
        return true;
    }
    if value.starts_with(' ') || value.ends_with(' ') {
        return true;
    }
    if value.contains('\n') || value.contains('\t') {
        return true;
    }
    if is_key && value.contains('.') {
        return true;
    }
    false
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

// Shortest representation that round-trips, nudged so that floats re-parse
// as floats rather than ints.
fn format_float(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    text
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::String(s) => {
            if needs_quoting(s, false) {
                escape_string(s)
            } else {
                s.clone()
            }
        }
        // Containers are handled by emit_node.
        other => unreachable!("cannot format {} as a scalar", other.type_name()),
    }
}

fn format_key(key: &str) -> String {
    if needs_quoting(key, true) {
        escape_string(key)
    } else {
        key.to_string()
    }
}

fn indentation(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}

fn emit_sequence(seq: &[Value], out: &mut String, indent: usize) {
    if seq.is_empty() {
        indentation(out, indent);
        out.push_str("[]\n");
        return;
    }
    for item in seq {
        indentation(out, indent);
        out.push('-');
        match item {
            Value::Mapping(map) if map.is_empty() => out.push_str(" {}\n"),
            Value::Sequence(inner) if inner.is_empty() => out.push_str(" []\n"),
            Value::Mapping(_) | Value::Sequence(_) => {
                out.push('\n');
                emit_node(item, out, indent + 2);
            }
            scalar => {
                out.push(' ');
                out.push_str(&format_scalar(scalar));
                out.push('\n');
            }
        }
    }
}

fn emit_mapping(map: &indexmap::IndexMap<String, Value>, out: &mut String, indent: usize) {
    if map.is_empty() {
        indentation(out, indent);
        out.push_str("{}\n");
        return;
    }
    for (key, child) in map {
        indentation(out, indent);
        out.push_str(&format_key(key));
        out.push(':');
        match child {
            Value::Mapping(inner) if inner.is_empty() => out.push_str(" {}\n"),
            Value::Sequence(inner) if inner.is_empty() => out.push_str(" []\n"),
            Value::Mapping(_) | Value::Sequence(_) => {
                out.push('\n');
                emit_node(child, out, indent + 2);
            }
            scalar => {
                out.push(' ');
                out.push_str(&format_scalar(scalar));
                out.push('\n');
            }
        }
    }
}

fn emit_node(value: &Value, out: &mut String, indent: usize) {
    match value {
        Value::Mapping(map) => emit_mapping(map, out, indent),
        Value::Sequence(seq) => emit_sequence(seq, out, indent),
        scalar => {
            indentation(out, indent);
            out.push_str(&format_scalar(scalar));
            out.push('\n');
        }
    }
}

/// Append `value` rendered as block-style YAML to `out`.
pub fn emit_yaml(value: &Value, out: &mut String, indent: usize) {
    emit_node(value, out, indent);
}

pub fn to_yaml_string(value: &Value) -> String {
    let mut out = String::new();
    emit_yaml(value, &mut out, 0);
    out
}

pub fn write_yaml_file(value: &Value, path: &Path) -> Result<(), ConfigError> {
    let rendered = to_yaml_string(value);
    std::fs::write(path, rendered).map_err(|e| ConfigError::FileError {
        message: format!("failed to write file: {}", e),
        path: path.display().to_string(),
        hint: None,
        code: Some(700),
    })
}
