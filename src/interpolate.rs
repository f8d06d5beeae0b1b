// Author: Dustin Pilgrim
// License: MIT

//! Resolution of `${...}` placeholders inside string leaves.
//!
//! Placeholder bodies are either a `now:<strftime>` timestamp, an
//! `oc.env:NAME[,fallback]` environment lookup, or a dotted path into the
//! tree itself. Referenced nodes are resolved on demand, with a
//! resolving/resolved set pair for cycle detection and memoization.

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::Local;

use crate::error::ConfigError;
use crate::path::{find_path, parse_path, render_path};
use crate::value::Value;

struct ResolveState {
    resolving: HashSet<String>,
    resolved: HashSet<String>,
}

fn node_key(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        render_path(path)
    }
}

/// Walk a path that may cross sequences (numeric segments), unlike
/// `find_path`, which is mapping-only.
fn descend<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Mapping(map) => map.get(segment)?,
            Value::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn descend_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Mapping(map) => map.get_mut(segment)?,
            Value::Sequence(seq) => seq.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn format_now(pattern: &str) -> Result<String, ConfigError> {
    let mut out = String::new();
    write!(out, "{}", Local::now().format(pattern)).map_err(|_| ConfigError::Runtime {
        message: format!("failed to format timestamp pattern '{}'", pattern),
        hint: Some("Use strftime specifiers, e.g. %Y-%m-%d_%H-%M-%S".into()),
        code: Some(504),
    })?;
    Ok(out)
}

fn node_to_string(node: &Value, reference: &str) -> Result<String, ConfigError> {
    match node {
        Value::String(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(ConfigError::NotScalar {
            reference: reference.to_string(),
            found: other.type_name().to_string(),
            hint: None,
            code: Some(503),
        }),
    }
}

fn resolve_env_expression(
    root: &mut Value,
    body: &str,
    state: &mut ResolveState,
) -> Result<String, ConfigError> {
    let (var, fallback) = match body.find(',') {
        Some(comma) => (body[..comma].trim(), body[comma + 1..].trim()),
        None => (body.trim(), ""),
    };

    // An empty variable counts as unset and takes the fallback branch.
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    if fallback.is_empty() {
        return Ok(String::new());
    }
    resolve_string(root, fallback, state)
}

fn resolve_expression(
    root: &mut Value,
    expression: &str,
    state: &mut ResolveState,
) -> Result<String, ConfigError> {
    if let Some(pattern) = expression.strip_prefix("now:") {
        return format_now(pattern);
    }
    if let Some(body) = expression.strip_prefix("oc.env:") {
        return resolve_env_expression(root, body, state);
    }

    let target_path = parse_path(expression)?;
    if find_path(root, &target_path).is_none() {
        return Err(target_not_found(expression));
    }
    resolve_node(root, &target_path, state)?;
    let target = find_path(root, &target_path).ok_or_else(|| target_not_found(expression))?;
    node_to_string(target, expression)
}

fn target_not_found(reference: &str) -> ConfigError {
    ConfigError::TargetNotFound {
        reference: reference.to_string(),
        hint: Some("Check that the referenced key exists in the composed config".into()),
        code: Some(502),
    }
}

/// Scan a placeholder body starting right after `${`.
///
/// Returns the body text and the number of bytes consumed including the
/// terminating `}`. A backslash escapes a following `}` or backslash pair;
/// other escape pairs pass through untouched so path escaping still works.
fn scan_placeholder(text: &str) -> Option<(String, usize)> {
    let mut body = String::new();
    let mut chars = text.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '}' => return Some((body, idx + 1)),
            '\\' => match chars.next() {
                Some((_, '}')) => body.push('}'),
                Some((_, escaped)) => {
                    body.push('\\');
                    body.push(escaped);
                }
                None => return None,
            },
            _ => body.push(ch),
        }
    }
    None
}

fn resolve_string(
    root: &mut Value,
    value: &str,
    state: &mut ResolveState,
) -> Result<String, ConfigError> {
    let mut result = String::new();
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some((body, consumed)) = scan_placeholder(after) else {
            return Err(ConfigError::UnterminatedPlaceholder {
                value: value.to_string(),
                hint: Some("Every '${' needs a closing '}'".into()),
                code: Some(501),
            });
        };
        result.push_str(&resolve_expression(root, &body, state)?);
        rest = &after[consumed..];
    }
    result.push_str(rest);
    Ok(result)
}

fn resolve_node(
    root: &mut Value,
    path: &[String],
    state: &mut ResolveState,
) -> Result<(), ConfigError> {
    let key = node_key(path);
    if state.resolved.contains(&key) {
        return Ok(());
    }
    if !state.resolving.insert(key.clone()) {
        return Err(ConfigError::InterpolationCycle {
            path: key,
            hint: None,
            code: Some(500),
        });
    }

    enum Shape {
        MappingKeys(Vec<String>),
        SequenceLen(usize),
        Text(String),
        OtherScalar,
    }

    let shape = match descend(root, path) {
        Some(Value::Mapping(map)) => Shape::MappingKeys(map.keys().cloned().collect()),
        Some(Value::Sequence(seq)) => Shape::SequenceLen(seq.len()),
        Some(Value::String(text)) => Shape::Text(text.clone()),
        _ => Shape::OtherScalar,
    };

    match shape {
        Shape::MappingKeys(keys) => {
            for child_key in keys {
                let mut child_path = path.to_vec();
                child_path.push(child_key);
                resolve_node(root, &child_path, state)?;
            }
        }
        Shape::SequenceLen(len) => {
            for index in 0..len {
                let mut child_path = path.to_vec();
                child_path.push(index.to_string());
                resolve_node(root, &child_path, state)?;
            }
        }
        Shape::Text(text) => {
            let replacement = resolve_string(root, &text, state)?;
            if let Some(node) = descend_mut(root, path) {
                *node = Value::String(replacement);
            }
        }
        Shape::OtherScalar => {}
    }

    state.resolving.remove(&key);
    state.resolved.insert(key);
    Ok(())
}

/// Resolve every `${...}` placeholder in the tree, depth-first, mutating
/// string leaves in place.
pub fn resolve_interpolations(root: &mut Value) -> Result<(), ConfigError> {
    let mut state = ResolveState {
        resolving: HashSet::new(),
        resolved: HashSet::new(),
    };
    resolve_node(root, &[], &mut state)
}
