//! Dotted-path parsing and path-based lookup/mutation over a value tree.
//!
//! Segments are joined by unescaped `.`; a literal `.` or `\` inside a
//! segment is escaped with a preceding `\`.

use crate::error::ConfigError;
use crate::value::Value;

/// Split a dotted path expression into its segments.
pub fn parse_path(expression: &str) -> Result<Vec<String>, ConfigError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut escape = false;

    for ch in expression.chars() {
        if escape {
            current.push(ch);
            escape = false;
        } else if ch == '\\' {
            escape = true;
        } else if ch == '.' {
            if current.is_empty() {
                return Err(malformed(expression, "empty path segment"));
            }
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }

    if escape {
        return Err(malformed(expression, "dangling escape at end of path"));
    }
    if current.is_empty() {
        return Err(malformed(expression, "path cannot be empty or end with '.'"));
    }
    segments.push(current);
    Ok(segments)
}

/// Render segments back into a dotted path, escaping `.` and `\`.
///
/// Inverse of [`parse_path`]: `parse_path(&render_path(s)).unwrap() == s`.
pub fn render_path(segments: &[String]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        for ch in segment.chars() {
            if ch == '.' || ch == '\\' {
                out.push('\\');
            }
            out.push(ch);
        }
    }
    out
}

/// Walk mapping lookups segment by segment.
///
/// Returns `None` when an intermediate node is not a mapping or a key is
/// absent. The empty path returns the root itself.
pub fn find_path<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        match current {
            Value::Mapping(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

pub fn find_path_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path {
        match current {
            Value::Mapping(map) => current = map.get_mut(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Assign `value` at `path`, walking (and with `require_new`, creating)
/// intermediate mappings.
///
/// The root must be null (treated as an empty mapping) or a mapping.
/// `require_new=true` means the assignment must create a new leaf key and
/// fails on collision; `require_new=false` means every segment must already
/// exist and the leaf is overwritten.
pub fn assign_path(
    root: &mut Value,
    path: &[String],
    value: Value,
    require_new: bool,
) -> Result<(), ConfigError> {
    let Some((leaf, intermediate)) = path.split_last() else {
        return Err(ConfigError::MalformedPath {
            message: "cannot assign to an empty path".to_string(),
            path: String::new(),
            hint: None,
            code: Some(200),
        });
    };

    if root.is_null() {
        *root = Value::mapping();
    }
    let mut current = match root {
        Value::Mapping(map) => map,
        other => {
            return Err(ConfigError::InvalidRoot {
                found: other.type_name().to_string(),
                hint: None,
                code: Some(204),
            });
        }
    };

    for segment in intermediate {
        let child = match current.entry(segment.clone()) {
            indexmap::map::Entry::Occupied(entry) => entry.into_mut(),
            indexmap::map::Entry::Vacant(entry) => {
                if !require_new {
                    return Err(missing(segment));
                }
                entry.insert(Value::mapping())
            }
        };
        current = match child {
            Value::Mapping(map) => map,
            other => {
                return Err(ConfigError::NotAMapping {
                    segment: segment.clone(),
                    found: other.type_name().to_string(),
                    hint: None,
                    code: Some(202),
                });
            }
        };
    }

    let exists = current.contains_key(leaf);
    if exists && require_new {
        return Err(ConfigError::KeyAlreadyExists {
            segment: leaf.clone(),
            hint: Some(format!("Drop the '+' prefix to overwrite '{}'.", leaf)),
            code: Some(203),
        });
    }
    if !exists && !require_new {
        return Err(missing(leaf));
    }
    current.insert(leaf.clone(), value);
    Ok(())
}

fn missing(segment: &str) -> ConfigError {
    ConfigError::MissingPath {
        segment: segment.to_string(),
        hint: Some(format!(
            "Use '+{}=...' to introduce new parameters.",
            segment
        )),
        code: Some(201),
    }
}

fn malformed(expression: &str, message: &str) -> ConfigError {
    ConfigError::MalformedPath {
        message: message.to_string(),
        path: expression.to_string(),
        hint: None,
        code: Some(200),
    }
}
